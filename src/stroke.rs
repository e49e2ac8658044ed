//! Fans out the external stroke to path converter, one process per icon.
//!
//! Every process is spawned up front so they all run in parallel, then a rayon pool
//! blocks on their exits. Each icon gets its own [`StrokeOutcome`]; the caller
//! decides what a failure means.
use crate::{error::StrokeToPathError, iconlist::IconName};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
};

pub const DEFAULT_CONVERTER: &str = "/usr/local/bin/svg-stroke-to-path";

/// Converts stroked outlines to filled paths, rewriting the svg in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrokeToPath {
    pub binary: PathBuf,
    /// Passed before the svg file.
    pub args: Vec<String>,
}

impl Default for StrokeToPath {
    fn default() -> Self {
        StrokeToPath {
            binary: PathBuf::from(DEFAULT_CONVERTER),
            args: default_args(),
        }
    }
}

pub fn default_args() -> Vec<String> {
    vec!["SameStrokeColor".to_string(), "stroke=\"#000\"".to_string()]
}

/// What happened to one icon.
#[derive(Debug)]
pub struct StrokeOutcome {
    pub icon: IconName,
    pub svg: PathBuf,
    pub result: Result<(), StrokeToPathError>,
}

impl StrokeOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl StrokeToPath {
    fn command(&self, svg: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args)
            .arg(svg)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped());
        cmd
    }

    fn spawn(&self, svg: &Path) -> Result<Child, StrokeToPathError> {
        self.command(svg)
            .spawn()
            .map_err(|e| StrokeToPathError::SpawnError(self.binary.clone(), e))
    }

    /// Runs the converter on `<svg_dir>/<icon>.svg` for every icon and waits for all
    /// of them. Outcomes are returned in input order.
    pub fn convert_all(&self, svg_dir: &Path, icons: &[IconName]) -> Vec<StrokeOutcome> {
        let spawned: Vec<_> = icons
            .iter()
            .map(|icon| {
                let svg = svg_dir.join(icon.svg_file_name());
                tracing::debug!("Spawning {:?} for {:?}", self.binary, svg);
                let child = self.spawn(&svg);
                (icon.clone(), svg, child)
            })
            .collect();

        spawned
            .into_par_iter()
            .map(|(icon, svg, child)| {
                let result = child.and_then(wait);
                if let Err(e) = &result {
                    tracing::debug!("{icon}: {e}");
                }
                StrokeOutcome { icon, svg, result }
            })
            .collect()
    }
}

fn wait(child: Child) -> Result<(), StrokeToPathError> {
    let output = child
        .wait_with_output()
        .map_err(StrokeToPathError::WaitError)?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(StrokeToPathError::Failed(output.status, stderr))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::assert_matches;
    use pretty_assertions::assert_eq;

    fn icons(names: &[&str]) -> Vec<IconName> {
        names.iter().map(|n| IconName::new(n)).collect()
    }

    fn converter(binary: &str, args: &[&str]) -> StrokeToPath {
        StrokeToPath {
            binary: PathBuf::from(binary),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn default_invocation() {
        let cmd = StrokeToPath::default().command(Path::new("/icons/x.svg"));
        assert_eq!(cmd.get_program(), DEFAULT_CONVERTER);
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["SameStrokeColor", "stroke=\"#000\"", "/icons/x.svg"]);
    }

    #[test]
    fn all_succeed_in_order() {
        let outcomes =
            converter("true", &[]).convert_all(Path::new("/icons"), &icons(&["a", "b", "c"]));

        let names: Vec<_> = outcomes.iter().map(|o| o.icon.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(outcomes.iter().all(StrokeOutcome::is_success));
        assert_eq!(outcomes[1].svg, PathBuf::from("/icons/b.svg"));
    }

    #[test]
    fn reports_each_failure() {
        // Fails for any file whose name contains "bad".
        let sh = converter(
            "sh",
            &["-c", "case \"$0\" in *bad*) echo broken >&2; exit 3;; esac"],
        );
        let outcomes = sh.convert_all(Path::new("/icons"), &icons(&["ok", "bad", "fine"]));

        assert!(outcomes[0].is_success());
        assert!(outcomes[2].is_success());
        let Err(StrokeToPathError::Failed(status, stderr)) = &outcomes[1].result else {
            panic!("expected a failure, got {:?}", outcomes[1].result);
        };
        assert_eq!(status.code(), Some(3));
        assert_eq!(stderr, "broken");
    }

    #[test]
    fn missing_binary() {
        let outcomes = converter("/nonexistent/stroke-to-path", &[])
            .convert_all(Path::new("/icons"), &icons(&["a"]));

        assert_matches!(&outcomes[0].result, Err(StrokeToPathError::SpawnError(..)));
    }

    #[test]
    fn no_icons() {
        assert!(converter("false", &[])
            .convert_all(Path::new("/icons"), &[])
            .is_empty());
    }
}
