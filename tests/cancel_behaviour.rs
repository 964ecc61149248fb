#![cfg(unix)]

use std::error::Error;
use std::time::{Duration, Instant};

use psexec::builder::ExecutorBuilder;
use psexec::exec::CancellationToken;
use psexec_test_utils::{init_tracing, with_timeout, write_script, FakeInterpreter, RecordingContext};

type TestResult = Result<(), Box<dyn Error>>;

fn pid_alive(pid: i32) -> bool {
    std::path::Path::new(&format!("/proc/{pid}")).exists()
        && !std::fs::read_to_string(format!("/proc/{pid}/stat"))
            .map(|s| s.contains(") Z "))
            .unwrap_or(true)
}

#[tokio::test]
async fn cancellation_kills_the_child_promptly() -> TestResult {
    init_tracing();
    let interp = FakeInterpreter::shared();
    let script = write_script(
        interp.dir(),
        "long_running.sh",
        "echo \"pid=$$\"\nexec sleep 30\n",
    )?;

    let ctx = RecordingContext::new();
    let mut b = ExecutorBuilder::new(ctx.source());
    b.interpreter(interp.program());
    let executor = b.set_file(&script)?.build()?;

    let cancel = CancellationToken::new();
    let run = tokio::spawn({
        let cancel = cancel.clone();
        async move { executor.start(cancel).await }
    });

    with_timeout(ctx.wait_for("pid=")).await;
    let pid: i32 = ctx.lines()[0].trim_start_matches("pid=").parse()?;

    let triggered = Instant::now();
    cancel.cancel();
    let report = with_timeout(run).await??;

    assert!(report.cancelled);
    assert_eq!(report.exit_code, None);
    assert!(triggered.elapsed() < Duration::from_secs(5));

    // The killed child is reaped by tokio's orphan queue; give it a moment.
    let deadline = Instant::now() + Duration::from_secs(5);
    while pid_alive(pid) && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    if std::path::Path::new("/proc/self").exists() {
        assert!(!pid_alive(pid), "child {pid} still running after cancellation");
    }

    let lines_at_cancel = ctx.lines();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(ctx.lines(), lines_at_cancel);
    Ok(())
}

#[tokio::test]
async fn cancelled_before_start_never_spawns() -> TestResult {
    let interp = FakeInterpreter::shared();
    let marker = interp.dir().join("spawned-marker");
    let script = write_script(
        interp.dir(),
        "marker.sh",
        &format!("touch '{}'\n", marker.display()),
    )?;

    let ctx = RecordingContext::new();
    let mut b = ExecutorBuilder::new(ctx.source());
    b.interpreter(interp.program());
    let executor = b.set_file(&script)?.build()?;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = with_timeout(executor.start(cancel)).await?;

    assert!(report.cancelled);
    assert!(!marker.exists());
    Ok(())
}

#[tokio::test]
async fn natural_exit_is_not_reported_as_cancelled() -> TestResult {
    let ctx = RecordingContext::new();
    let mut b = ExecutorBuilder::new(ctx.source());
    b.interpreter(FakeInterpreter::shared().program());
    let executor = b.set_command("echo done").build()?;

    let cancel = CancellationToken::new();
    let report = with_timeout(executor.start(cancel.clone())).await?;
    cancel.cancel();

    assert!(!report.cancelled);
    assert_eq!(report.exit_code, Some(0));
    assert_eq!(ctx.lines(), vec!["done"]);
    Ok(())
}
