use crate::date::{add_period, format_date, parse_date, EpochSeconds, Period};
use crate::error::{RecurError, Result};
use crate::log::Logger;
use crate::parser::parse_header;
use tracing::Level;

use std::fmt;

const COMPONENT: &str = "Template";

/// One recurring entry of the config: a due date, a period and fixed body text.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    date: String,
    separator: String,
    period_text: String,
    period: Period,
    due: EpochSeconds,
    // lines[0] is the remainder of the header line.
    lines: Vec<String>,
}

impl Template {
    /// Builds a template from a config line, `None` when the line is not a
    /// template header.
    pub fn from_header(line: &str) -> Result<Option<Template>> {
        let header = match parse_header(line)? {
            Some(header) => header,
            None => return Ok(None),
        };

        Ok(Some(Template {
            date: header.date.to_string(),
            separator: header.separator.to_string(),
            period_text: header.period.to_string(),
            period: header.period.parse()?,
            due: parse_date(header.date)?,
            lines: vec![header.rest.to_string()],
        }))
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn due(&self) -> EpochSeconds {
        self.due
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn period_text(&self) -> &str {
        &self.period_text
    }

    fn header_rest(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }

    fn body(&self) -> &[String] {
        self.lines.get(1..).unwrap_or_default()
    }

    /// Ledger text for the current due date: a separating newline, the header
    /// without its period annotation, then the non-blank body lines.
    pub fn occurrence(&self) -> String {
        let mut text = format!("\n{}{}", self.date, self.header_rest());
        self.body()
            .iter()
            .filter(|line| !line.trim().is_empty())
            .for_each(|line| text.push_str(line));
        text
    }

    /// Emits one occurrence per period up to and including `target`, leaving
    /// the template due strictly after `target`.
    pub fn generate(&mut self, target: EpochSeconds, logger: &dyn Logger) -> Result<Vec<String>> {
        let mut occurrences = Vec::new();
        while self.due <= target {
            occurrences.push(self.occurrence());
            logger.log(
                Level::DEBUG,
                Some(COMPONENT),
                &format!("due {} every {}", self.date, self.period_text),
            );

            let next = add_period(self.due, self.period)?;
            if next <= self.due {
                return Err(RecurError::InvalidPeriod {
                    date: self.date.clone(),
                    period: self.period_text.clone(),
                });
            }
            self.due = next;
            self.date = format_date(next)?;
        }
        Ok(occurrences)
    }
}

/// Config text of the template, period annotation included.
impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}({}){}",
            self.date,
            self.separator,
            self.period_text,
            self.header_rest()
        )?;
        self.body().iter().try_for_each(|line| f.write_str(line))
    }
}
