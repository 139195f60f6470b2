/*!

This is the long-form manual for `competency_core` and `compdash`.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values, UTF-8
* `xlsx`, `xlsm`, `xls`, `ods` spreadsheets. Only the first worksheet is read.
* `zip` archives containing any of the above. The rows of all the files are
  concatenated, other entries are ignored.

In all cases the first row holds the headers and every following row is one
respondent.

### Headers

Headers are compared without spaces and without case. The first matching rule
wins:

| header contains                 | meaning            |
|---------------------------------|--------------------|
| `학과`, `전공`, `dept`, `부서`  | department         |
| `성별`, `gender`, `sex` (or is `성`) | gender        |
| `학년`, `grade`, `연차`         | year of study      |
| `전형`, `모집`, `admission`     | admission track    |
| a number                        | question number    |

Other columns (timestamps, e-mail addresses, comments) are ignored.

### Cells

- gender: `1`, `남`, `남성`, `남자`, `m`, `male` are male; `2`, `여`, `여성`,
  `여자`, `f`, `female` are female; anything else is counted as unknown.
- year of study: the leading integer. A missing or unreadable year counts as
  year 1. Years outside 1 to 4 are not counted in the year distribution.
- admission track: grouped into `학생부교과`, `학생부종합`, `수능(정시)`,
  `실기/실적`, `재외국인` and `기타/미분류`.
- answers: the leading number of the cell (`4점` reads as 4).

```text
학과,성별,학년,모집전형,문항 1,문항 2,...,문항 60
간호학과,여,2,학생부종합,5,4,...,4
```

## Scoring

The 60 questions form 6 competencies of 10 questions, each split into 2
sub-competencies of 5 questions:

| competency               | questions |
|--------------------------|-----------|
| `selfConfidence`         | 1-10      |
| `lifeDesign`             | 11-20     |
| `professionalism`        | 21-30     |
| `creativeChallenge`      | 31-40     |
| `convergenceComm`        | 41-50     |
| `communityParticipation` | 51-60     |

Each answer is put on a 0-100 scale: values up to 5 are multiplied by 20,
larger values are taken as-is, and the result is clamped to 0-100. For every
respondent, a competency score is the mean of the answered questions of the
group. Missing answers are left out; a respondent who answered none of the
questions of a group scores 0 for it. The summary score is the mean over the
respondents, rounded to 2 decimals.

## Categories

Departments are assigned to academic categories by name:

| category         | department name contains                              |
|------------------|-------------------------------------------------------|
| `AI·SW융합대학`  | 디지털콘텐츠, 인공지능, 컴퓨터, 사이버보안, 융합IT, AI, SW |
| `간호대학`       | 간호                                                  |
| `군사경찰계열`   | 군사, 경찰                                            |
| `글로벌경영계열` | 경영, 글로벌, 금융, 세무                              |
| `의과학계열`     | 의예, 의학, 임상병리, 방사선, 치위생                  |
| `의료공과계열`   | 의료공학, 제약공학, 의료IT                            |
| `재활복지계열`   | 물리치료, 작업치료, 언어치료, 사회복지, 아동보육, 안경광학 |
| `창의융합계열`   | 문화산업, 유아교육, 초등특수, 심리                    |
| `기타창의계열`   | anything else                                         |

The rules are tried in order, so `경영AI학과` belongs to `AI·SW융합대학`.

A category score is the average of the scores of its departments, weighted by
their number of respondents, and rounded to 1 decimal. The category of a
department is never stored: it is always recomputed from the name.

## Configuration

`compdash` runs without any configuration. A JSON file can be passed with
`--config` to change the defaults:

```text
{
  "storageDirectory": ".compdash",
  "storageKey": "KYU_CORE_COMP_2026_DATA_V4",
  "report": {
    "model": "gemini-3-pro-preview",
    "endpoint": "https://generativelanguage.googleapis.com/v1beta",
    "apiKeyEnv": "API_KEY",
    "temperature": 0.3,
    "chatTemperature": 0.4,
    "timeoutSecs": 60
  }
}
```

All the keys are optional. `--state-dir` overrides `storageDirectory`.

The state is stored in `<storageDirectory>/<storageKey>.json`. If that file
is corrupted or was written by an incompatible version, it is replaced by the
sample data and a warning is printed.

 */
