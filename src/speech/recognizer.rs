//! Recognizers backed by local programs

use super::{Recognizer, SpeechError};
use crate::backend::{BackendClientTrait, FilePayload};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::oneshot;

/// How long a stopped program gets to exit after SIGTERM
const STOP_GRACE: Duration = Duration::from_secs(1);
/// How long to keep reading output once the program is gone
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Runs a speech-to-text program that prints the transcript on stdout.
///
/// `{lang}` in any argument is replaced with the configured language.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    language: String,
}

impl CommandRecognizer {
    pub fn new(program: &str, args: Vec<String>, language: String) -> Self {
        Self {
            program: program.to_string(),
            args,
            language,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = spawnable(&self.program);
        cmd.stdout(Stdio::piped())
            .args(substitute(&self.args, &[("{lang}", self.language.as_str())]));
        cmd
    }
}

#[async_trait]
impl Recognizer for CommandRecognizer {
    fn is_available(&self) -> bool {
        find_program(&self.program).is_some()
    }

    async fn listen(&self, stop: oneshot::Receiver<()>) -> Result<String, SpeechError> {
        let mut child = self.command().spawn().map_err(SpeechError::from_spawn)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpeechError::Other("stdout unavailable".to_string()))?;

        let (status, output) = read_until_stopped(&mut child, stdout, stop).await?;
        interpret_output(status, &String::from_utf8_lossy(&output))
    }
}

/// Records audio with a local program, then transcribes it through the
/// form service.
///
/// `{output}` in any argument is replaced with the recording path and
/// `{lang}` with the configured language.
pub struct BackendRecognizer {
    program: String,
    args: Vec<String>,
    language: String,
    backend: Arc<dyn BackendClientTrait>,
}

impl BackendRecognizer {
    pub fn new(
        program: &str,
        args: Vec<String>,
        language: String,
        backend: Arc<dyn BackendClientTrait>,
    ) -> Self {
        Self {
            program: program.to_string(),
            args,
            language,
            backend,
        }
    }

    async fn record(&self, output: &Path, stop: oneshot::Receiver<()>) -> Result<(), SpeechError> {
        let output_arg = output.to_string_lossy();
        let mut child = spawnable(&self.program)
            .stdout(Stdio::null())
            .args(substitute(
                &self.args,
                &[("{output}", output_arg.as_ref()), ("{lang}", self.language.as_str())],
            ))
            .spawn()
            .map_err(SpeechError::from_spawn)?;

        match run_until_stopped(&mut child, stop).await? {
            Some(status) if !status.success() => Err(SpeechError::Other(format!(
                "recorder exited with {status}"
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Recognizer for BackendRecognizer {
    fn is_available(&self) -> bool {
        find_program(&self.program).is_some()
    }

    async fn listen(&self, stop: oneshot::Receiver<()>) -> Result<String, SpeechError> {
        let output = std::env::temp_dir().join(format!("bharatvoice-{}.wav", uuid::Uuid::new_v4()));
        let recorded = self.record(&output, stop).await;

        let audio = match recorded {
            Ok(()) => FilePayload::read(&output).await.map_err(|_| SpeechError::NoSpeech),
            Err(e) => Err(e),
        };
        let _ = tokio::fs::remove_file(&output).await;
        let audio = audio?;
        if audio.bytes.is_empty() {
            return Err(SpeechError::NoSpeech);
        }

        tracing::debug!(bytes = audio.bytes.len(), "sending recording for transcription");
        self.backend
            .speech_to_text(audio)
            .await
            .map_err(|e| SpeechError::Other(e.to_string()))
    }
}

/// Base command for recognizer programs. Each run gets its own process
/// group so that stopping reaches helpers spawned by wrapper scripts.
fn spawnable(program: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.kill_on_drop(true)
        .stdin(Stdio::null())
        .stderr(Stdio::null());
    #[cfg(unix)]
    cmd.process_group(0);
    cmd
}

/// Wait for the child to exit, or stop it when `stop` fires.
/// Returns None for a stopped child.
async fn run_until_stopped(
    child: &mut Child,
    mut stop: oneshot::Receiver<()>,
) -> Result<Option<ExitStatus>, SpeechError> {
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        _ = &mut stop => None,
    };

    match exited {
        Some(status) => status
            .map(Some)
            .map_err(|e| SpeechError::Other(format!("wait failed: {e}"))),
        None => {
            terminate(child).await;
            Ok(None)
        }
    }
}

enum Progress {
    Read(std::io::Result<usize>),
    Exited(std::io::Result<ExitStatus>),
    Stopped,
}

/// Collect stdout while the child runs. Reading alongside the wait keeps a
/// chatty program from blocking on a full pipe.
async fn read_until_stopped(
    child: &mut Child,
    mut stdout: ChildStdout,
    mut stop: oneshot::Receiver<()>,
) -> Result<(Option<ExitStatus>, Vec<u8>), SpeechError> {
    let mut output = Vec::new();
    let mut chunk = [0u8; 1024];
    let mut stdout_open = true;

    let status = loop {
        let progress = tokio::select! {
            read = stdout.read(&mut chunk), if stdout_open => Progress::Read(read),
            status = child.wait() => Progress::Exited(status),
            _ = &mut stop => Progress::Stopped,
        };
        match progress {
            Progress::Read(Ok(0)) | Progress::Read(Err(_)) => stdout_open = false,
            Progress::Read(Ok(n)) => output.extend_from_slice(&chunk[..n]),
            Progress::Exited(status) => {
                break Some(status.map_err(|e| SpeechError::Other(format!("wait failed: {e}")))?)
            }
            Progress::Stopped => {
                terminate(child).await;
                break None;
            }
        }
    };

    // Leftover helpers may still hold the pipe open; don't wait on them
    if stdout_open {
        let _ = tokio::time::timeout(DRAIN_GRACE, stdout.read_to_end(&mut output)).await;
    }
    Ok((status, output))
}

/// Ask the process group to finish (recorders finalize their files on
/// SIGTERM), then force whatever is left.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pgid) = child.id() {
            signal_group("TERM", pgid).await;
            let exited = tokio::time::timeout(STOP_GRACE, child.wait()).await;
            signal_group("KILL", pgid).await;
            if matches!(exited, Ok(Ok(_))) {
                return;
            }
        }
    }
    let _ = child.start_kill();
    let _ = child.wait().await;
}

#[cfg(unix)]
async fn signal_group(signal: &str, pgid: u32) {
    let sent = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg("--")
        .arg(format!("-{pgid}"))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    if let Err(e) = sent {
        tracing::debug!(error = %e, signal, "could not signal recognizer");
    }
}

/// Turn a finished program's stdout into a transcript
fn interpret_output(status: Option<ExitStatus>, stdout: &str) -> Result<String, SpeechError> {
    let text = stdout.trim();
    match status {
        Some(status) if !status.success() && text.is_empty() => Err(SpeechError::Other(format!(
            "recognizer exited with {status}"
        ))),
        _ if text.is_empty() => Err(SpeechError::NoSpeech),
        _ => Ok(text.to_string()),
    }
}

fn substitute(args: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            vars.iter()
                .fold(arg.clone(), |acc, (key, value)| acc.replace(key, value))
        })
        .collect()
}

/// Resolve a program name the way the shell would
fn find_program(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, MockBackendClientTrait};
    use pretty_assertions::assert_eq;

    #[cfg(unix)]
    fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[test]
    fn test_substitute_placeholders() {
        let args = vec![
            "--lang={lang}".to_string(),
            "-o".to_string(),
            "{output}".to_string(),
        ];
        let out = substitute(&args, &[("{output}", "/tmp/a.wav"), ("{lang}", "hi-IN")]);
        assert_eq!(out, vec!["--lang=hi-IN", "-o", "/tmp/a.wav"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_interpret_output() {
        assert_eq!(
            interpret_output(Some(exit_status(0)), " Asha Devi\n"),
            Ok("Asha Devi".to_string())
        );
        assert_eq!(
            interpret_output(Some(exit_status(0)), "\n"),
            Err(SpeechError::NoSpeech)
        );
        assert_eq!(interpret_output(None, ""), Err(SpeechError::NoSpeech));
        assert_eq!(interpret_output(None, "partial"), Ok("partial".to_string()));
        assert!(matches!(
            interpret_output(Some(exit_status(2)), ""),
            Err(SpeechError::Other(_))
        ));
    }

    #[test]
    fn test_find_program() {
        assert!(find_program("definitely-not-a-real-program-xyz").is_none());
        assert!(find_program("/definitely/not/here").is_none());
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let recognizer =
            CommandRecognizer::new("definitely-not-a-real-program-xyz", vec![], "en-IN".into());
        assert!(!recognizer.is_available());
    }

    #[tokio::test]
    async fn test_missing_program_listen_is_unsupported() {
        let recognizer =
            CommandRecognizer::new("definitely-not-a-real-program-xyz", vec![], "en-IN".into());
        let (_tx, rx) = oneshot::channel();
        assert_eq!(recognizer.listen(rx).await, Err(SpeechError::Unsupported));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_transcript_from_stdout() {
        let recognizer = CommandRecognizer::new(
            "sh",
            vec!["-c".to_string(), "echo 'spoken in {lang}'".to_string()],
            "en-IN".into(),
        );
        let (_tx, rx) = oneshot::channel();
        assert_eq!(
            recognizer.listen(rx).await,
            Ok("spoken in en-IN".to_string())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_stop_keeps_partial_output() {
        let recognizer = CommandRecognizer::new(
            "sh",
            vec!["-c".to_string(), "echo heard; exec sleep 10".to_string()],
            "en-IN".into(),
        );
        let (tx, rx) = oneshot::channel();
        let listen = tokio::spawn(async move { recognizer.listen(rx).await });
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        tx.send(()).unwrap();
        assert_eq!(listen.await.unwrap(), Ok("heard".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_ends_wrapper_script_promptly() {
        // No exec: the shell keeps a child holding stdout
        let recognizer = CommandRecognizer::new(
            "sh",
            vec!["-c".to_string(), "echo heard; sleep 5; true".to_string()],
            "en-IN".into(),
        );
        let (tx, rx) = oneshot::channel();
        let started = std::time::Instant::now();
        let listen = tokio::spawn(async move { recognizer.listen(rx).await });
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        tx.send(()).unwrap();

        assert_eq!(listen.await.unwrap(), Ok("heard".to_string()));
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_large_output_does_not_block() {
        let recognizer = CommandRecognizer::new(
            "sh",
            vec![
                "-c".to_string(),
                "i=0; while [ $i -lt 2000 ]; do echo 0123456789abcdef0123456789abcdef; i=$((i+1)); done"
                    .to_string(),
            ],
            "en-IN".into(),
        );
        let (_tx, rx) = oneshot::channel();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), recognizer.listen(rx))
            .await
            .expect("recognizer hung on a full pipe");
        assert_eq!(result.unwrap().lines().count(), 2000);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stopped_recorder_finishes_its_file() {
        let mut backend = MockBackendClientTrait::new();
        backend
            .expect_speech_to_text()
            .withf(|audio| audio.bytes == b"RIFF")
            .times(1)
            .returning(|_| Ok("haan".to_string()));

        // Writes the recording only when asked to stop, like arecord does
        let recognizer = BackendRecognizer::new(
            "sh",
            vec![
                "-c".to_string(),
                "trap 'printf RIFF > \"$0\"; exit 0' TERM; sleep 10 & wait".to_string(),
                "{output}".to_string(),
            ],
            "en-IN".into(),
            Arc::new(backend),
        );
        let (tx, rx) = oneshot::channel();
        let listen = tokio::spawn(async move { recognizer.listen(rx).await });
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        tx.send(()).unwrap();

        assert_eq!(listen.await.unwrap(), Ok("haan".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_backend_recognizer_transcribes_recording() {
        let mut backend = MockBackendClientTrait::new();
        backend
            .expect_speech_to_text()
            .withf(|audio| audio.mime == "audio/wav" && audio.bytes == b"RIFF")
            .times(1)
            .returning(|_| Ok("mera naam Ravi".to_string()));

        let recognizer = BackendRecognizer::new(
            "sh",
            vec!["-c".to_string(), "printf RIFF > \"$0\"".to_string(), "{output}".to_string()],
            "en-IN".into(),
            Arc::new(backend),
        );
        let (_tx, rx) = oneshot::channel();
        assert_eq!(recognizer.listen(rx).await, Ok("mera naam Ravi".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_backend_recognizer_without_recording_is_no_speech() {
        let mut backend = MockBackendClientTrait::new();
        backend.expect_speech_to_text().never();

        let recognizer = BackendRecognizer::new(
            "sh",
            vec!["-c".to_string(), "true".to_string()],
            "en-IN".into(),
            Arc::new(backend),
        );
        let (_tx, rx) = oneshot::channel();
        assert_eq!(recognizer.listen(rx).await, Err(SpeechError::NoSpeech));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_backend_failure_is_other() {
        let mut backend = MockBackendClientTrait::new();
        backend
            .expect_speech_to_text()
            .returning(|_| Err(BackendError::Rejected("model not loaded".to_string())));

        let recognizer = BackendRecognizer::new(
            "sh",
            vec!["-c".to_string(), "printf RIFF > \"$0\"".to_string(), "{output}".to_string()],
            "en-IN".into(),
            Arc::new(backend),
        );
        let (_tx, rx) = oneshot::channel();
        assert_eq!(
            recognizer.listen(rx).await,
            Err(SpeechError::Other("model not loaded".to_string()))
        );
    }
}
