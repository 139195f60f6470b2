/*!

# Quick start with an online survey form

This example runs the survey end to end, from a form that collects the
answers to the summaries printed by `compdash`. Any form tool that exports a
spreadsheet (Google Forms, Microsoft Forms, Qualtrics) works the same way.

**Creating the survey** The form needs one question per piece of
information:
- the department (`학과`), as free text or as a drop-down list,
- the gender (`성별`): `남` / `여` (or `1` / `2`),
- the year of study (`학년`): 1 to 4,
- the admission track (`모집전형`), optional,
- the 60 survey questions, as 5-point scales.

The exact wording of the headers does not matter much: a header containing
`학과` or `전공` is read as the department, a header containing a number
(`문항 12`, `Q12`, `12. 나는 ...`) is read as question 12. The easiest way to
start is to generate a template:

```bash
compdash template survey_template.csv
```

**Collecting the answers** Share the form. When the survey is closed, export
the responses as an Excel (`.xlsx`) or CSV file. Several exports (one per
college, for example) can be uploaded together inside a ZIP archive.

**Uploading** Run:

```bash
compdash upload responses.xlsx
```

The program reads all the rows, computes the summaries and stores them. You
should see something like this:

```text
[2026-03-02T09:12:01Z INFO  compdash::dash] upload: read 412 rows from "responses.xlsx"
[2026-03-02T09:12:01Z INFO  competency_core] aggregate_all: processing 412 responses
[2026-03-02T09:12:01Z INFO  competency_core] aggregate_all: 17 departments
[2026-03-02T09:12:01Z INFO  competency_core] Category: AI·SW융합대학: 4 departments, 96 responses
[2026-03-02T09:12:01Z INFO  competency_core] Category: 간호대학: 1 departments, 120 responses
...
```

followed by the summary of the whole university in JSON.

**Looking at the results** The stored state can be inspected at any level:

```bash
compdash show
compdash show --category 간호대학
compdash show --dept 간호학과
```

With an API key in the `API_KEY` environment variable, a written analysis of
a department can be requested:

```bash
compdash report 간호학과
compdash chat "자기신뢰 역량이 가장 높은 계열은?"
```

It is the end of this quick start. The [manual](../manual/index.html) covers
the header rules, the scoring and the configuration file.

*/
