use crate::date::EpochSeconds;
use crate::error::Result;
use crate::log::{Logger, TracingLogger};
use crate::store::Store;
use crate::template::Template;
use tracing::Level;

use std::fmt;
use std::path::Path;

const COMPONENT: &str = "Schedule";

/// A parsed config: free text before the first template, then the templates
/// in file order.
pub struct Schedule {
    preamble: String,
    templates: Vec<Template>,
    logger: Box<dyn Logger>,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::new()
    }
}

impl Schedule {
    pub fn new() -> Schedule {
        Schedule {
            preamble: String::new(),
            templates: Vec::new(),
            logger: Box::new(TracingLogger),
        }
    }

    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Schedule {
        self.logger = Box::new(logger);
        self
    }

    /// Builds a schedule from config lines that still carry their terminators.
    /// Lines before the first header form the preamble, later ones belong to
    /// the template opened last.
    pub fn from_lines<I>(lines: I) -> Result<Schedule>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut schedule = Schedule::new();
        for line in lines {
            let line = line.into();
            match Template::from_header(&line)? {
                Some(template) => schedule.templates.push(template),
                None => match schedule.templates.last_mut() {
                    Some(open) => open.push_line(line),
                    None => schedule.preamble.push_str(&line),
                },
            }
        }
        Ok(schedule)
    }

    /// Reads the config at `path` through `store`.
    pub fn load(path: &Path, store: &dyn Store) -> Result<Schedule> {
        crate::parser::parse_file(path, store)
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    fn log(&self, level: Level, message: &str) {
        self.logger.log(level, Some(COMPONENT), message);
    }

    /// Generates every occurrence due on or before `target`, advancing each
    /// template past `target`. The result is sorted, which orders it by date.
    ///
    /// The first failing template aborts the whole run.
    pub fn generate(&mut self, target: EpochSeconds) -> Result<Vec<String>> {
        let mut occurrences = Vec::new();
        for template in self.templates.iter_mut() {
            occurrences.extend(template.generate(target, self.logger.as_ref())?);
        }
        occurrences.sort();
        Ok(occurrences)
    }

    /// Generates up to `target` and, when anything was due, rewrites the
    /// config and appends the occurrences to the ledger. Returns how many
    /// occurrences were posted.
    ///
    /// The two writes are not atomic together: the config may already be
    /// rewritten when the ledger append fails. Callers that need stronger
    /// guarantees keep backups of both files.
    pub fn post(
        &mut self,
        target: EpochSeconds,
        config: &Path,
        ledger: &Path,
        store: &dyn Store,
    ) -> Result<usize> {
        let occurrences = self.generate(target)?;
        if occurrences.is_empty() {
            self.log(Level::INFO, "nothing due");
            return Ok(0);
        }

        store.overwrite(config, &self.to_string())?;
        store.append(ledger, &occurrences.concat())?;
        self.log(
            Level::INFO,
            &format!(
                "posted {} transaction(s) to {}, advanced {}",
                occurrences.len(),
                ledger.display(),
                config.display()
            ),
        );
        Ok(occurrences.len())
    }
}

/// Config text: the preamble followed by every template.
impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preamble)?;
        self.templates
            .iter()
            .try_for_each(|template| write!(f, "{}", template))
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schedule")
            .field("preamble", &self.preamble)
            .field("templates", &self.templates)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_date;
    use crate::error::RecurError;
    use crate::log::testing::CapturingLogger;
    use crate::parser::parse;
    use crate::store::FileStore;
    use anyhow::Result;

    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;
    use std::rc::Rc;

    const CONFIG: &str = "; notes\n2011-07-01(1m)\n  Rent  100\n";

    #[test]
    fn round_trip_before_generation() -> Result<()> {
        let text = "; recurring entries\n\n2011/07/01 (1m) * Rent\n  Expenses:Rent  100\n\n2012-02-29\t(1y) Insurance\n  ; yearly\n";
        assert_eq!(parse(text)?.to_string(), text);
        assert_eq!(parse("")?.to_string(), "");
        assert_eq!(parse("no templates here\n")?.preamble(), "no templates here\n");
        Ok(())
    }

    #[test]
    fn generate_and_serialize() -> Result<()> {
        let mut schedule = parse(CONFIG)?;
        let occurrences = schedule.generate(parse_date("2011-08-15")?)?;

        assert_eq!(
            occurrences,
            vec!["\n2011-07-01\n  Rent  100\n", "\n2011-08-01\n  Rent  100\n"]
        );
        assert_eq!(schedule.templates()[0].date(), "2011-09-01");
        assert_eq!(
            schedule.to_string(),
            "; notes\n2011-09-01(1m)\n  Rent  100\n"
        );
        Ok(())
    }

    #[test]
    fn every_template_ends_after_target() -> Result<()> {
        let mut schedule = parse("2011-01-01(1d)\n2011-01-31(1m)\n2010-02-28(1y)\n2011-03-01(1w)\n")?;
        let target = parse_date("2011-03-10")?;
        schedule.generate(target)?;
        assert!(schedule.templates().iter().all(|t| t.due() > target));
        assert!(schedule.generate(target)?.is_empty());
        Ok(())
    }

    #[test]
    fn rewritten_config_reloads_without_reposting() -> Result<()> {
        let target = parse_date("2011-07-01 06:00")?;
        let mut schedule = parse("2011-07-01(1d)\n  Coffee\n2011-06-30 (1w)\n  Paper\n")?;
        assert_eq!(schedule.generate(target)?.len(), 2);

        let mut reloaded = parse(&schedule.to_string())?;
        assert_eq!(reloaded.to_string(), schedule.to_string());
        for (before, after) in schedule.templates().iter().zip(reloaded.templates()) {
            assert_eq!(before.due(), after.due());
        }
        assert!(reloaded.generate(target)?.is_empty());
        Ok(())
    }

    #[test]
    fn occurrences_sorted_across_templates() -> Result<()> {
        let mut schedule = parse(
            "2011-07-20(1m) Late\n  Expenses:Phone\n2011-07-05(2w) Early\n  Expenses:Food\n",
        )?;
        let occurrences = schedule.generate(parse_date("2011-08-10")?)?;
        let dates: Vec<&str> = occurrences.iter().map(|o| &o[1..11]).collect();
        assert_eq!(dates, vec!["2011-07-05", "2011-07-19", "2011-07-20", "2011-08-02"]);
        Ok(())
    }

    #[test]
    fn invalid_period_aborts_generation() -> Result<()> {
        let mut schedule = parse("2011-07-01(1m)\n2011-07-01(0m)\n")?;
        let err = schedule.generate(parse_date("2011-08-01")?).unwrap_err();
        assert!(matches!(err, RecurError::InvalidPeriod { .. }), "{:?}", err);
        Ok(())
    }

    #[test]
    fn post_writes_config_and_ledger() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = dir.path().join("ledger.rec");
        let ledger = dir.path().join("ledger.dat");
        fs::write(&config, CONFIG)?;
        fs::write(&ledger, "2011-06-01 Opening\n  Assets:Bank  1000\n")?;

        let logger = Rc::new(CapturingLogger::default());
        let mut schedule = Schedule::load(&config, &FileStore)?.with_logger(logger.clone());
        let posted = schedule.post(parse_date("2011-08-15")?, &config, &ledger, &FileStore)?;

        assert_eq!(posted, 2);
        assert_eq!(
            fs::read_to_string(&config)?,
            "; notes\n2011-09-01(1m)\n  Rent  100\n"
        );
        assert_eq!(
            fs::read_to_string(&ledger)?,
            "2011-06-01 Opening\n  Assets:Bank  1000\n\n2011-07-01\n  Rent  100\n\n2011-08-01\n  Rent  100\n"
        );
        assert!(logger
            .0
            .borrow()
            .iter()
            .any(|(_, message)| message.starts_with("Schedule: posted 2 transaction(s)")));
        Ok(())
    }

    #[test]
    fn post_without_due_entries_leaves_files_alone() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = dir.path().join("ledger.rec");
        let ledger = dir.path().join("ledger.dat");
        fs::write(&config, CONFIG)?;

        let mut schedule = Schedule::load(&config, &FileStore)?;
        assert_eq!(schedule.post(parse_date("2011-06-30")?, &config, &ledger, &FileStore)?, 0);
        assert_eq!(fs::read_to_string(&config)?, CONFIG);
        assert!(!ledger.exists());
        Ok(())
    }

    #[derive(Default)]
    struct FailingLedger {
        written: RefCell<Vec<PathBuf>>,
    }

    impl Store for FailingLedger {
        fn read_lines(&self, _: &Path) -> crate::error::Result<Vec<String>> {
            Ok(CONFIG.split_inclusive('\n').map(String::from).collect())
        }

        fn overwrite(&self, path: &Path, _: &str) -> crate::error::Result<()> {
            self.written.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        fn append(&self, path: &Path, _: &str) -> crate::error::Result<()> {
            Err(RecurError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        }
    }

    #[test]
    fn post_reports_ledger_failure_after_config_rewrite() -> Result<()> {
        let store = FailingLedger::default();
        let config = Path::new("ledger.rec");
        let mut schedule = Schedule::load(config, &store)?;
        let err = schedule
            .post(parse_date("2011-07-01")?, config, Path::new("ledger.dat"), &store)
            .unwrap_err();

        assert!(matches!(err, RecurError::Io { .. }));
        assert_eq!(*store.written.borrow(), vec![config.to_path_buf()]);
        Ok(())
    }
}
