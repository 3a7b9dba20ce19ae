/*!

This is the long-form manual for `tally_sheet` and `tallydash`.

## Workbook format

The input is an Excel workbook (`.xlsx`) with one sheet per reporting period,
typically one sheet per year (`2024`, `2025`, ...). Each sheet looks like:

| Miembro | 2025-12-01 | 2025-12-02 | ... | #KGDs | KPD |
|---------|------------|------------|-----|-------|-----|
| Ana     | 1          | 2          |     | 3     | 1.5 |
| Beto    | 0          | 4          |     | 4     | 2.0 |
| Total   | 1          | 6          |     | 7     | 3.5 |

### Member column

The first header matching one of `miembro`, `member`, `nombre`, `name`,
`participante`, `participant` holds the participant names. Matching ignores
case and whitespaces. If no header matches, the first column is used.

### Total and average columns

Both are optional.
- total: `#kgds`, `kgds`, `total`, `total de cagadas`, `total kgds`, `totals`
- average (KPD): `kpd`, `cagadas diarias`, `promedio`, `promedio diario`,
  `average`, `avg`, `per day`, `daily average`

When the total column is missing, the total of a participant is the sum of
its days. When the average column is missing, the average is the total
divided by the number of day columns.

The label sets can be replaced in the configuration file (see below).

### Day columns

All the other columns with a non-empty header are day columns. A header that
is a date (either a date cell or a text such as `2025-12-01 00:00:00`,
`01/12/2025`, `1-Dec-2025`) is displayed as `1-Dec`. A header such as `1-Dec`
without a year is read as a date when the sheet name is a year. Any other
header is displayed as is.

Empty cells count as zero.

### Total row

A row whose name is `Total` (any case) is not a participant. It provides the
sheet-wide total shown in the summary metrics.

## Command line

```bash
tallydash -i Poopydiscoop.xlsx --sheet 2025 --view ranking
```

- `--sheet` defaults to the last sheet of the workbook. `--list-sheets` prints
  the sheets and exits.
- `--participants` restricts the metrics, the daily chart, the ranking and the
  heatmap to some participants. It can be repeated or given a comma-separated
  list.
- `--rival-a`, `--rival-b` choose the two participants of the rivalry view.
  They default to the first two participants of the sheet.
- `--view` is one of `summary`, `daily`, `ranking`, `heatmap`, `rivalry`, `all`.
- `--out` writes the whole dashboard in JSON, to a file or to `stdout`.
- `--reference` compares the JSON dashboard with a reference file and fails if
  they differ.
- `--interactive` starts a session where the selection can be changed with
  commands. Type `help` in the session for the list of commands.

## Configuration

All the options can also be provided in a JSON file passed with `--config`:

```json
{
  "workbookPath": "Poopydiscoop.xlsx",
  "sheetName": "2025",
  "participants": ["Ana", "Beto"],
  "rivals": ["Ana", "Beto"],
  "view": "all",
  "outputPath": "dashboard.json",
  "labels": {
    "member": ["runner"],
    "total": ["sum"],
    "average": ["mean"]
  }
}
```

The workbook path is relative to the configuration file. Command line flags
take precedence over the configuration file.

*/
