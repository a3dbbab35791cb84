//! Comma-separated ledger files: one header record, then data records.
//!
//! Fields containing a comma, quote or line break are quoted with `"` and inner
//! quotes doubled. `\r\n` line endings are accepted on read.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableError {
    UnterminatedQuote { line: usize },
    UnexpectedHeader { expected: String, found: String },
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::UnterminatedQuote { line } => {
                write!(f, "unterminated quoted field starting on line {}", line)
            }
            TableError::UnexpectedHeader { expected, found } => {
                write!(f, "expected header '{}', found '{}'", expected, found)
            }
            TableError::ColumnCount {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {} has {} columns, expected {}",
                line, found, expected
            ),
        }
    }
}

impl std::error::Error for TableError {}

pub fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = render_record(header.iter().copied());
    for row in rows {
        out.push_str(&render_record(row.iter().map(String::as_str)));
    }
    out
}

/// Parses `contents` and checks it against `header`. Empty input yields no rows.
pub fn parse_table(contents: &str, header: &[&str]) -> Result<Vec<Vec<String>>, TableError> {
    let mut records = parse_records(contents)?.into_iter();
    let (_, first) = match records.next() {
        Some(value) => value,
        None => return Ok(Vec::new()),
    };
    if first.len() != header.len() || first.iter().zip(header).any(|(left, right)| left != right) {
        return Err(TableError::UnexpectedHeader {
            expected: header.join(","),
            found: first.join(","),
        });
    }
    let mut rows = Vec::new();
    for (line, record) in records {
        if record.len() != header.len() {
            return Err(TableError::ColumnCount {
                line,
                expected: header.len(),
                found: record.len(),
            });
        }
        rows.push(record);
    }
    Ok(rows)
}

fn render_record<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut line = fields.map(escape_field).collect::<Vec<String>>().join(",");
    line.push('\n');
    line
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Returns each record with the line it starts on. Blank lines are skipped.
fn parse_records(contents: &str) -> Result<Vec<(usize, Vec<String>)>, TableError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = contents.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, record_line, std::mem::take(&mut record));
                line += 1;
                record_line = line;
            }
            _ => field.push(ch),
        }
    }
    if in_quotes {
        return Err(TableError::UnterminatedQuote { line: record_line });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record_line, record);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, record: Vec<String>) {
    if record.len() == 1 && record[0].is_empty() {
        return;
    }
    records.push((line, record));
}
