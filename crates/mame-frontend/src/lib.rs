//! Invoke MAME's command-line frontend and parse what it prints.
//!
//! Every operation exists in a sync and an async variant with identical
//! argument construction and identical output parsing; they differ only in
//! how the subprocess is awaited. Async children are spawned with
//! kill-on-drop, so cancelling an awaited call terminates the process rather
//! than orphaning it. A missing executable surfaces as
//! [`FrontendError::ToolUnavailable`] before anything is parsed — callers
//! with a saved `-listxml` snapshot can fall back to it, MAME itself being
//! optional.

mod verify;

pub use verify::{
    parse_verify_roms, parse_verify_softlist, FileIssue, FileReport, RomsetStatus,
    RomsetVerification, SoftwareVerification, VerifyReport,
};

use std::collections::BTreeMap;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use mame_model::{MachineElement, ModelError, SoftwareListElement};
use mame_xml::{FragmentReader, XmlBackend, XmlError};

const NO_SUCH_SOFTWARE_LISTS: &str = "No such software lists found";

/// Error type produced by frontend invocations.
#[derive(Debug, Error)]
pub enum FrontendError {
    /// The executable does not exist or cannot be started. Recoverable by
    /// falling back to a saved listing snapshot.
    #[error("MAME is not available at {}: {source}", path.display())]
    ToolUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A command that must exit zero did not.
    #[error("{command} exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    /// `-listxml BASENAME` produced no matching machine record.
    #[error("machine not found: {0}")]
    MachineNotFound(String),
    /// `-getsoftlist NAME` reported no such list.
    #[error("software list not found: {0}")]
    SoftwareListNotFound(String),
    /// Other subprocess I/O failure.
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Wrapper around one MAME binary, holding everything needed to build and
/// run frontend commands.
#[derive(Debug, Clone)]
pub struct MameExecutable {
    path: PathBuf,
    backend: XmlBackend,
}

impl MameExecutable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MameExecutable {
            path: path.into(),
            backend: XmlBackend::default(),
        }
    }

    /// Select the XML backend used for whole-document parses.
    pub fn with_backend(path: impl Into<PathBuf>, backend: XmlBackend) -> Self {
        MameExecutable {
            path: path.into(),
            backend,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn spawn_error(&self, err: io::Error) -> FrontendError {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                FrontendError::ToolUnavailable {
                    path: self.path.clone(),
                    source: err,
                }
            }
            _ => FrontendError::Io(err),
        }
    }

    fn command_failed(args: &[&str], output: &Output) -> FrontendError {
        FrontendError::CommandFailed {
            command: args.join(" "),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output, FrontendError> {
        debug!(mame = %self.path.display(), ?args, "running frontend command");
        std::process::Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| self.spawn_error(err))
    }

    async fn run_async(&self, args: &[&str]) -> Result<Output, FrontendError> {
        debug!(mame = %self.path.display(), ?args, "running frontend command");
        tokio::process::Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| self.spawn_error(err))
    }

    fn status(&self, args: &[&str]) -> Result<ExitStatus, FrontendError> {
        debug!(mame = %self.path.display(), ?args, "running frontend command");
        std::process::Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|err| self.spawn_error(err))
    }

    async fn status_async(&self, args: &[&str]) -> Result<ExitStatus, FrontendError> {
        debug!(mame = %self.path.display(), ?args, "running frontend command");
        tokio::process::Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|err| self.spawn_error(err))
    }

    fn expect_success(args: &[&str], output: Output) -> Result<Output, FrontendError> {
        if !output.status.success() {
            return Err(Self::command_failed(args, &output));
        }
        if !output.stderr.is_empty() {
            debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "frontend command wrote to stderr"
            );
        }
        Ok(output)
    }

    /// The version string printed by `-version`.
    pub fn version(&self) -> Result<String, FrontendError> {
        let args = ["-version"];
        let output = Self::expect_success(&args, self.run(&args)?)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Async variant of [`version`](Self::version).
    pub async fn version_async(&self) -> Result<String, FrontendError> {
        let args = ["-version"];
        let output = Self::expect_success(&args, self.run_async(&args).await?)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn machine_from_listxml(&self, basename: &str, output: &Output) -> Result<MachineElement, FrontendError> {
        let doc = Arc::new(mame_xml::parse_with(&output.stdout, self.backend)?);
        let node = doc
            .root()
            .descendants_named("machine")
            .find(|el| el.attr("name") == Some(basename))
            .map(|el| el.id())
            .ok_or_else(|| FrontendError::MachineNotFound(basename.to_string()))?;
        Ok(MachineElement::new(doc, node)?)
    }

    fn listxml_failure(basename: &str, args: &[&str], output: &Output) -> FrontendError {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("Unknown system") {
            FrontendError::MachineNotFound(basename.to_string())
        } else {
            Self::command_failed(args, output)
        }
    }

    /// One machine record via `-listxml BASENAME`.
    pub fn machine_xml(&self, basename: &str) -> Result<MachineElement, FrontendError> {
        let args = ["-listxml", basename];
        let output = self.run(&args)?;
        if !output.status.success() {
            return Err(Self::listxml_failure(basename, &args, &output));
        }
        self.machine_from_listxml(basename, &output)
    }

    /// Async variant of [`machine_xml`](Self::machine_xml).
    pub async fn machine_xml_async(&self, basename: &str) -> Result<MachineElement, FrontendError> {
        let args = ["-listxml", basename];
        let output = self.run_async(&args).await?;
        if !output.status.success() {
            return Err(Self::listxml_failure(basename, &args, &output));
        }
        self.machine_from_listxml(basename, &output)
    }

    fn machines_from_listxml(&self, basename: &str, output: &Output) -> Result<BTreeMap<String, MachineElement>, FrontendError> {
        let doc = Arc::new(mame_xml::parse_with(&output.stdout, self.backend)?);
        let map: BTreeMap<String, MachineElement> = mame_model::machine_elements(&doc)
            .map(|machine| (machine.basename().to_string(), machine))
            .collect();
        if map.is_empty() {
            return Err(FrontendError::MachineNotFound(basename.to_string()));
        }
        Ok(map)
    }

    /// One machine and every device it references, keyed by basename. A
    /// single `-listxml BASENAME` call already returns all of them.
    pub fn machine_xml_with_devices(
        &self,
        basename: &str,
    ) -> Result<BTreeMap<String, MachineElement>, FrontendError> {
        let args = ["-listxml", basename];
        let output = self.run(&args)?;
        if !output.status.success() {
            return Err(Self::listxml_failure(basename, &args, &output));
        }
        self.machines_from_listxml(basename, &output)
    }

    /// Async variant of [`machine_xml_with_devices`](Self::machine_xml_with_devices).
    pub async fn machine_xml_with_devices_async(
        &self,
        basename: &str,
    ) -> Result<BTreeMap<String, MachineElement>, FrontendError> {
        let args = ["-listxml", basename];
        let output = self.run_async(&args).await?;
        if !output.status.success() {
            return Err(Self::listxml_failure(basename, &args, &output));
        }
        self.machines_from_listxml(basename, &output)
    }

    /// Stream every machine record out of a full `-listxml` run without
    /// buffering the whole dump. Dropping the iterator early kills and reaps
    /// the child.
    pub fn stream_machines(&self) -> Result<MachineStream, FrontendError> {
        debug!(mame = %self.path.display(), "streaming -listxml");
        let mut child = std::process::Command::new(&self.path)
            .arg("-listxml")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| self.spawn_error(err))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
        Ok(MachineStream {
            child,
            fragments: FragmentReader::new(BufReader::new(stdout), "machine"),
            finished: false,
        })
    }

    /// Async variant of a full listing: collects `-listxml` output, then
    /// parses record by record.
    pub async fn all_machines_async(&self) -> Result<Vec<MachineElement>, FrontendError> {
        let args = ["-listxml"];
        let output = Self::expect_success(&args, self.run_async(&args).await?)?;
        let mut machines = Vec::new();
        for fragment in FragmentReader::new(&output.stdout[..], "machine") {
            match MachineElement::from_document(fragment?) {
                Ok(machine) => machines.push(machine),
                Err(err) => warn!(error = %err, "skipping malformed <machine> record"),
            }
        }
        Ok(machines)
    }

    fn softlist_from_output(&self, name: &str, output: Output) -> Result<SoftwareListElement, FrontendError> {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        // the frontend exits 0 for this, the diagnostic is the only signal
        if stderr == NO_SUCH_SOFTWARE_LISTS {
            return Err(FrontendError::SoftwareListNotFound(name.to_string()));
        }
        if !stderr.is_empty() {
            warn!(list = %name, %stderr, "frontend wrote to stderr while getting software list");
        }
        if !output.status.success() {
            return Err(Self::command_failed(&["-getsoftlist", name], &output));
        }
        let doc = mame_xml::parse_with(&output.stdout, self.backend)?;
        Ok(SoftwareListElement::from_document(doc)?)
    }

    /// One software list via `-getsoftlist NAME`.
    pub fn software_list(&self, name: &str) -> Result<SoftwareListElement, FrontendError> {
        let output = self.run(&["-getsoftlist", name])?;
        self.softlist_from_output(name, output)
    }

    /// Async variant of [`software_list`](Self::software_list).
    pub async fn software_list_async(&self, name: &str) -> Result<SoftwareListElement, FrontendError> {
        let output = self.run_async(&["-getsoftlist", name]).await?;
        self.softlist_from_output(name, output)
    }

    /// Basenames of every software list the machine roster references, via
    /// `-listsoftware -nodtd`.
    pub fn software_list_names(&self) -> Result<Vec<String>, FrontendError> {
        let args = ["-listsoftware", "-nodtd"];
        let output = Self::expect_success(&args, self.run(&args)?)?;
        Self::softlist_names_from_xml(&output.stdout)
    }

    /// Async variant of [`software_list_names`](Self::software_list_names).
    pub async fn software_list_names_async(&self) -> Result<Vec<String>, FrontendError> {
        let args = ["-listsoftware", "-nodtd"];
        let output = Self::expect_success(&args, self.run_async(&args).await?)?;
        Self::softlist_names_from_xml(&output.stdout)
    }

    fn softlist_names_from_xml(stdout: &[u8]) -> Result<Vec<String>, FrontendError> {
        let mut names = Vec::new();
        for fragment in FragmentReader::new(stdout, "softwarelist") {
            let doc = fragment?;
            if let Some(name) = doc.root().attr("name") {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// Whether a machine's ROM set verifies, from the exit status alone.
    pub fn verify_roms(&self, basename: &str) -> Result<bool, FrontendError> {
        Ok(self.status(&["-verifyroms", basename])?.success())
    }

    /// Async variant of [`verify_roms`](Self::verify_roms).
    pub async fn verify_roms_async(&self, basename: &str) -> Result<bool, FrontendError> {
        Ok(self.status_async(&["-verifyroms", basename]).await?.success())
    }

    /// Whether a machine's sample set verifies.
    pub fn verify_samples(&self, basename: &str) -> Result<bool, FrontendError> {
        Ok(self.status(&["-verifysamples", basename])?.success())
    }

    /// Async variant of [`verify_samples`](Self::verify_samples).
    pub async fn verify_samples_async(&self, basename: &str) -> Result<bool, FrontendError> {
        Ok(self
            .status_async(&["-verifysamples", basename])
            .await?
            .success())
    }

    fn verify_args<'a>(basenames: &'a [&'a str]) -> Vec<&'a str> {
        let mut args = vec!["-verifyroms"];
        args.extend_from_slice(basenames);
        args
    }

    fn verify_report_from_output(basenames: &[&str], output: &Output) -> VerifyReport {
        let exit_code = output.status.code();
        let stdout = String::from_utf8_lossy(&output.stdout);
        if let [basename] = basenames {
            // single-set oddities are reported on stderr with exit != 0
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim_end();
            if stderr.ends_with("has no roms!") {
                return VerifyReport {
                    romsets: vec![RomsetVerification::status_only(basename, RomsetStatus::NoRoms)],
                    exit_code,
                };
            }
            if stderr.ends_with("not found!") {
                return VerifyReport {
                    romsets: vec![RomsetVerification::status_only(
                        basename,
                        RomsetStatus::NotFound,
                    )],
                    exit_code,
                };
            }
        }
        let romsets = parse_verify_roms(&stdout);
        if romsets.is_empty() && !output.status.success() && !stdout.trim().is_empty() {
            // likely a frontend version with a changed line format
            warn!("unrecognised -verifyroms output, no romset lines parsed");
        }
        VerifyReport { romsets, exit_code }
    }

    /// Detailed verification of one or more romsets. An empty slice verifies
    /// every set, which takes a while. A non-zero exit with parseable output
    /// is data, not an error: the frontend exits non-zero whenever any set
    /// fails verification, and the raw code is carried in the report.
    pub fn verify_roms_report(&self, basenames: &[&str]) -> Result<VerifyReport, FrontendError> {
        let args = Self::verify_args(basenames);
        let output = self.run(&args)?;
        Ok(Self::verify_report_from_output(basenames, &output))
    }

    /// Async variant of [`verify_roms_report`](Self::verify_roms_report).
    pub async fn verify_roms_report_async(
        &self,
        basenames: &[&str],
    ) -> Result<VerifyReport, FrontendError> {
        let args = Self::verify_args(basenames);
        let output = self.run_async(&args).await?;
        Ok(Self::verify_report_from_output(basenames, &output))
    }

    /// Usable software of one list via `-verifysoftlist NAME`. Non-zero exit
    /// is data here too.
    pub fn verify_software_list(
        &self,
        name: &str,
    ) -> Result<Vec<SoftwareVerification>, FrontendError> {
        let output = self.run(&["-verifysoftlist", name])?;
        Ok(parse_verify_softlist(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Async variant of [`verify_software_list`](Self::verify_software_list).
    pub async fn verify_software_list_async(
        &self,
        name: &str,
    ) -> Result<Vec<SoftwareVerification>, FrontendError> {
        let output = self.run_async(&["-verifysoftlist", name]).await?;
        Ok(parse_verify_softlist(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Usable software across every list.
    pub fn verify_all_software_lists(&self) -> Result<Vec<SoftwareVerification>, FrontendError> {
        let output = self.run(&["-verifysoftlist"])?;
        Ok(parse_verify_softlist(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Async variant of [`verify_all_software_lists`](Self::verify_all_software_lists).
    pub async fn verify_all_software_lists_async(
        &self,
    ) -> Result<Vec<SoftwareVerification>, FrontendError> {
        let output = self.run_async(&["-verifysoftlist"]).await?;
        Ok(parse_verify_softlist(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Streaming iterator over the machine records of a full `-listxml` run.
/// Malformed records are skipped with a warning; the child is killed and
/// reaped when the iterator is dropped before the end.
pub struct MachineStream {
    child: std::process::Child,
    fragments: FragmentReader<BufReader<std::process::ChildStdout>>,
    finished: bool,
}

impl Iterator for MachineStream {
    type Item = Result<MachineElement, FrontendError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            match self.fragments.next() {
                Some(Ok(doc)) => match MachineElement::from_document(doc) {
                    Ok(machine) => return Some(Ok(machine)),
                    Err(err) => {
                        warn!(error = %err, "skipping malformed <machine> record");
                    }
                },
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(err.into()));
                }
                None => {
                    self.finished = true;
                    match self.child.wait() {
                        Ok(status) if !status.success() => {
                            warn!(%status, "-listxml exited with a failure status");
                        }
                        Err(err) => warn!(error = %err, "failed to reap -listxml child"),
                        Ok(_) => {}
                    }
                    return None;
                }
            }
        }
    }
}

impl Drop for MachineStream {
    fn drop(&mut self) {
        // kill fails when the child already exited, which is fine
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_tool() -> MameExecutable {
        MameExecutable::new("/nonexistent/path/to/mame")
    }

    #[test]
    fn missing_executable_is_tool_unavailable() {
        let err = missing_tool().version().unwrap_err();
        assert!(matches!(err, FrontendError::ToolUnavailable { .. }));
        let err = missing_tool().verify_roms("puckman").unwrap_err();
        assert!(matches!(err, FrontendError::ToolUnavailable { .. }));
        let err = missing_tool().stream_machines().err().expect("spawn fails");
        assert!(matches!(err, FrontendError::ToolUnavailable { .. }));
    }

    #[tokio::test]
    async fn missing_executable_is_tool_unavailable_async() {
        let err = missing_tool().version_async().await.unwrap_err();
        assert!(matches!(err, FrontendError::ToolUnavailable { .. }));
        let err = missing_tool()
            .verify_roms_report_async(&["puckman"])
            .await
            .unwrap_err();
        assert!(matches!(err, FrontendError::ToolUnavailable { .. }));
    }

    #[cfg(unix)]
    mod fake_mame {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::sync::atomic::{AtomicU32, Ordering};

        static SCRIPT_COUNTER: AtomicU32 = AtomicU32::new(0);

        /// Stand-in MAME: a shell script that prints a canned transcript.
        fn fake_mame(body: &str) -> PathBuf {
            let n = SCRIPT_COUNTER.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "mamekit-fake-mame-{}-{n}.sh",
                std::process::id()
            ));
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake mame");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("make fake mame executable");
            path
        }

        #[test]
        fn version_comes_from_stdout() {
            let mame = MameExecutable::new(fake_mame("echo '0.262 (mame0262)'"));
            assert_eq!(mame.version().unwrap(), "0.262 (mame0262)");
        }

        #[test]
        fn nonzero_exit_with_parseable_output_is_data() {
            let mame = MameExecutable::new(fake_mame(
                "echo 'romset puckman is bad'\nexit 2",
            ));
            let report = mame.verify_roms_report(&["puckman"]).unwrap();
            assert_eq!(report.romsets.len(), 1);
            assert_eq!(report.romsets[0].status, RomsetStatus::Bad);
            assert_eq!(report.exit_code, Some(2));
            assert!(!report.all_okay());
        }

        #[test]
        fn single_set_stderr_oddities_get_dedicated_statuses() {
            let mame = MameExecutable::new(fake_mame(
                "echo 'romset \"z80\" has no roms!' >&2\nexit 1",
            ));
            let report = mame.verify_roms_report(&["z80"]).unwrap();
            assert_eq!(report.romsets[0].status, RomsetStatus::NoRoms);

            let mame = MameExecutable::new(fake_mame(
                "echo 'romset \"nothere\" not found!' >&2\nexit 1",
            ));
            let report = mame.verify_roms_report(&["nothere"]).unwrap();
            assert_eq!(report.romsets[0].status, RomsetStatus::NotFound);
        }

        #[test]
        fn missing_software_list_diagnostic_maps_to_not_found() {
            let mame = MameExecutable::new(fake_mame(
                "echo 'No such software lists found' >&2",
            ));
            let err = mame.software_list("nope").unwrap_err();
            assert!(matches!(err, FrontendError::SoftwareListNotFound(name) if name == "nope"));
        }

        #[test]
        fn stream_machines_yields_records_and_skips_stubs() {
            let listing = "<mame build=\\\"0.262\\\">\
                <machine name=\\\"puckman\\\"><description>PuckMan</description></machine>\
                <machine><description>stub</description></machine>\
                <machine name=\\\"pacman\\\" cloneof=\\\"puckman\\\"/>\
                </mame>";
            let mame = MameExecutable::new(fake_mame(&format!("echo \"{listing}\"")));
            let machines: Vec<_> = mame
                .stream_machines()
                .unwrap()
                .collect::<Result<_, _>>()
                .unwrap();
            assert_eq!(machines.len(), 2);
            assert_eq!(machines[0].basename(), "puckman");
            assert_eq!(machines[1].basename(), "pacman");
        }

        #[test]
        fn machine_xml_picks_the_requested_record() {
            let listing = "<mame><machine name=\\\"z80\\\" isdevice=\\\"yes\\\" runnable=\\\"no\\\"/>\
                <machine name=\\\"pacman\\\"><description>Pac-Man</description></machine></mame>";
            let mame = MameExecutable::new(fake_mame(&format!("echo \"{listing}\"")));
            let machine = mame.machine_xml("pacman").unwrap();
            assert_eq!(machine.basename(), "pacman");
            assert_eq!(machine.description(), "Pac-Man");
            let all = mame.machine_xml_with_devices("pacman").unwrap();
            assert_eq!(all.len(), 2);
            assert!(all["z80"].is_device());
        }

        #[tokio::test]
        async fn async_variants_parse_identically() {
            let mame = MameExecutable::new(fake_mame(
                "echo 'romset puckman is best available'\nexit 2",
            ));
            let report = mame.verify_roms_report_async(&["puckman"]).await.unwrap();
            assert_eq!(report.romsets[0].status, RomsetStatus::BestAvailable);
            assert_eq!(report.exit_code, Some(2));

            let listing = "<mame><machine name=\\\"puckman\\\"/></mame>";
            let mame = MameExecutable::new(fake_mame(&format!("echo \"{listing}\"")));
            let machines = mame.all_machines_async().await.unwrap();
            assert_eq!(machines.len(), 1);
        }

        #[cfg(target_os = "linux")]
        #[tokio::test]
        async fn cancelled_async_verification_leaves_no_child_behind() {
            use std::time::Duration;

            let n = SCRIPT_COUNTER.fetch_add(1, Ordering::Relaxed);
            let pid_file = std::env::temp_dir().join(format!(
                "mamekit-fake-mame-pid-{}-{n}",
                std::process::id()
            ));
            let mame = MameExecutable::new(fake_mame(&format!(
                "echo $$ > {}\nsleep 30",
                pid_file.display()
            )));

            let verify = mame.verify_roms_report_async(&["puckman"]);
            let cancelled =
                tokio::time::timeout(Duration::from_millis(300), verify).await;
            assert!(cancelled.is_err(), "the fake tool should outlive the timeout");

            let pid: u32 = fs::read_to_string(&pid_file)
                .expect("fake tool wrote its pid")
                .trim()
                .parse()
                .expect("pid is numeric");

            // kill-on-drop fires on cancellation; give the runtime a moment
            // to reap, then check the process table
            let mut gone = false;
            for _ in 0..20 {
                tokio::time::sleep(Duration::from_millis(100)).await;
                let stat = fs::read_to_string(format!("/proc/{pid}/stat"));
                match stat {
                    Err(_) => {
                        gone = true;
                        break;
                    }
                    Ok(stat) if stat.split_whitespace().nth(2) == Some("Z") => {
                        gone = true;
                        break;
                    }
                    Ok(_) => {}
                }
            }
            assert!(gone, "cancelled subprocess is still running");
            let _ = fs::remove_file(&pid_file);
        }
    }
}
