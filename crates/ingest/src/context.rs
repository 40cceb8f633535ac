use crate::comment::Commenter;
use crate::error::Result;
use radiotv_config::IngestConfig;
use radiotv_repository::Pid;

/// Settings shared by every ingest.
#[derive(Debug)]
pub struct Context {
    /// Allow updating a program object that already exists.
    pub overwrite: bool,
    /// Compare an existing object against the record and skip all writes
    /// when they match.
    pub check: bool,
    /// Object new program objects are cloned from.
    pub template: Pid,
    /// Predicate linking a program object to its file objects.
    pub has_file_relation: String,
    pub commenter: Commenter,
    /// Records ingested at the same time by [`ingest`](crate::ingest).
    pub concurrency: usize,
}
impl Context {
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        Ok(Self {
            overwrite: config.overwrite,
            check: config.check,
            template: Pid::new(config.template_pid.as_str()),
            has_file_relation: config.has_file_relation.clone(),
            commenter: config.comment_template.parse()?,
            concurrency: config.concurrency,
        })
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_from_default_config() {
        let context = Context::from_config(&IngestConfig::default()).unwrap();
        assert!(context.overwrite && context.check);
        assert_eq!(context.template.as_str(), "doms:Template_Program");
        assert_eq!(context.concurrency, 4);
    }

    #[test]
    fn test_bad_comment_template() {
        let config = IngestConfig {
            comment_template: "{% if %}".to_string(),
            ..IngestConfig::default()
        };
        let err = Context::from_config(&config).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }
}
