// ********* Competency model ***********
//
// The survey has 60 questions. Each competency owns 10 consecutive questions,
// split into two sub-competencies of 5 questions each.

use serde::{Deserialize, Serialize};

pub const NUM_QUESTIONS: u32 = 60;
const QUESTIONS_PER_COMPETENCY: u32 = 10;
const QUESTIONS_PER_SUB_COMPETENCY: u32 = 5;

/// Static description of a sub-competency.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct SubCompetencyDef {
    pub id: &'static str,
    pub name: &'static str,
    pub first_question: u32,
}

impl SubCompetencyDef {
    pub fn questions(&self) -> impl Iterator<Item = u32> {
        self.first_question..self.first_question + QUESTIONS_PER_SUB_COMPETENCY
    }
}

/// Static description of a competency.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CompetencyDef {
    pub id: &'static str,
    pub name: &'static str,
    pub first_question: u32,
    pub sub_competencies: [SubCompetencyDef; 2],
}

impl CompetencyDef {
    pub fn questions(&self) -> impl Iterator<Item = u32> {
        self.first_question..self.first_question + QUESTIONS_PER_COMPETENCY
    }
}

const fn sub(id: &'static str, name: &'static str, first_question: u32) -> SubCompetencyDef {
    SubCompetencyDef {
        id,
        name,
        first_question,
    }
}

pub const COMPETENCIES: [CompetencyDef; 6] = [
    CompetencyDef {
        id: "selfConfidence",
        name: "자기신뢰",
        first_question: 1,
        sub_competencies: [sub("sub1", "자기이해", 1), sub("sub2", "자기효능감", 6)],
    },
    CompetencyDef {
        id: "lifeDesign",
        name: "라이프디자인",
        first_question: 11,
        sub_competencies: [sub("sub3", "목표설정", 11), sub("sub4", "전략적실행", 16)],
    },
    CompetencyDef {
        id: "professionalism",
        name: "프로페셔널리즘",
        first_question: 21,
        sub_competencies: [sub("sub5", "전공전문성", 21), sub("sub6", "직업윤리", 26)],
    },
    CompetencyDef {
        id: "creativeChallenge",
        name: "창조적도전",
        first_question: 31,
        sub_competencies: [sub("sub7", "진취적도전", 31), sub("sub8", "성장탄력성", 36)],
    },
    CompetencyDef {
        id: "convergenceComm",
        name: "융화적소통",
        first_question: 41,
        sub_competencies: [sub("sub9", "자기표현", 41), sub("sub10", "개방적경청", 46)],
    },
    CompetencyDef {
        id: "communityParticipation",
        name: "공동체참여",
        first_question: 51,
        sub_competencies: [sub("sub11", "공동체이해", 51), sub("sub12", "역할행동", 56)],
    },
];

/// All the sub-competencies, in competency order.
pub fn sub_competencies() -> impl Iterator<Item = &'static SubCompetencyDef> {
    COMPETENCIES.iter().flat_map(|c| c.sub_competencies.iter())
}

// ********* Serializable copy, carried in the application state ***********

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SubCompetencyMapping {
    pub id: String,
    pub name: String,
    pub questions: Vec<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyMapping {
    pub id: String,
    pub name: String,
    pub questions: Vec<u32>,
    #[serde(rename = "subCompetencies")]
    pub sub_competencies: Vec<SubCompetencyMapping>,
}

impl From<&CompetencyDef> for CompetencyMapping {
    fn from(def: &CompetencyDef) -> CompetencyMapping {
        CompetencyMapping {
            id: def.id.to_string(),
            name: def.name.to_string(),
            questions: def.questions().collect(),
            sub_competencies: def
                .sub_competencies
                .iter()
                .map(|s| SubCompetencyMapping {
                    id: s.id.to_string(),
                    name: s.name.to_string(),
                    questions: s.questions().collect(),
                })
                .collect(),
        }
    }
}

pub fn competency_mappings() -> Vec<CompetencyMapping> {
    COMPETENCIES.iter().map(CompetencyMapping::from).collect()
}
