use super::state::TestSummary;
use tokio::sync::broadcast;

/// Suite execution events for real-time updates
#[derive(Debug, Clone)]
pub enum TestEvent {
    // Suite events
    SuiteStarted {
        session_id: String,
        suite_name: String,
        test_count: usize,
    },
    SuiteFinished {
        summary: TestSummary,
    },

    // Test events
    TestStarted {
        index: usize,
        name: String,
        title: String,
    },
    TestPassed {
        name: String,
        duration_ms: u64,
    },
    TestFailed {
        name: String,
        error: String,
        duration_ms: u64,
        screenshot: Option<String>,
    },
    TestSkipped {
        name: String,
        reason: String,
    },

    // Step events
    StepStarted {
        test: String,
        step: String,
    },
    StepFinished {
        test: String,
        step: String,
        passed: bool,
        duration_ms: u64,
    },
    Attached {
        test: String,
        name: String,
        body: Option<String>,
    },

    // Log event for coordinated output
    Log {
        message: String,
    },
}

/// Event emitter for broadcasting suite events
#[derive(Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(256);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }
}

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        use colored::Colorize;
        use std::io::IsTerminal;

        // Hidden target when piped, to avoid terminal escape codes in CI logs
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let mut spinner: Option<ProgressBar> = None;

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                TestEvent::SuiteStarted {
                    session_id,
                    suite_name,
                    test_count,
                } => {
                    println!(
                        "\n{} Suite {} started ({} tests, session {})",
                        "🚀".green().bold(),
                        suite_name.white().bold(),
                        test_count,
                        session_id.cyan()
                    );
                }

                TestEvent::SuiteFinished { summary } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("\n{} Suite finished", "■".blue().bold());
                    println!("  Total tests: {}", summary.total_tests);
                    println!(
                        "  {} passed, {} failed, {} skipped",
                        summary.passed.to_string().green(),
                        summary.failed.to_string().red(),
                        summary.skipped.to_string().yellow()
                    );
                    if summary.screenshots > 0 {
                        println!("  Screenshots: {}", summary.screenshots);
                    }
                    if let Some(duration) = summary.total_duration_ms {
                        println!("  Duration: {}ms", duration);
                    }
                }

                TestEvent::TestStarted { index, name, title } => {
                    println!(
                        "\n{} Starting test: {} {}",
                        "🔹".blue(),
                        format!("[{}] {}", index + 1, name).white().bold(),
                        format!("({})", title).dimmed()
                    );
                }

                TestEvent::TestPassed { name, duration_ms } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!(
                        "{} Test Passed: {} ({}ms)",
                        "✅".green(),
                        name,
                        duration_ms
                    );
                }

                TestEvent::TestFailed {
                    name,
                    error,
                    duration_ms,
                    screenshot,
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!(
                        "{} Test Failed: {} ({}ms)",
                        "❌".red(),
                        name.red().bold(),
                        duration_ms
                    );
                    println!("    {}", error.red());
                    if let Some(path) = screenshot {
                        println!("    {} Screenshot: {}", "📸".green(), path);
                    }
                }

                TestEvent::TestSkipped { name, reason } => {
                    println!(
                        "{} Test Skipped: {} ({})",
                        "⚠️".yellow(),
                        name,
                        reason.dimmed()
                    );
                }

                TestEvent::StepStarted { step, .. } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    let pb = multi.add(ProgressBar::new_spinner());
                    if let Ok(style) = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("    {spinner} {msg}")
                    {
                        pb.set_style(style);
                    }
                    pb.set_message(format!("{}...", step.dimmed()));
                    pb.enable_steady_tick(StdDuration::from_millis(100));
                    spinner = Some(pb);
                }

                TestEvent::StepFinished {
                    step,
                    passed,
                    duration_ms,
                    ..
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    let mark = if passed { "✓".green() } else { "✗".red() };
                    println!("    {} {} ({}ms)", mark, step, duration_ms);
                }

                TestEvent::Attached { name, body, .. } => {
                    let line = match body {
                        Some(body) if name == "note" => body,
                        Some(body) => format!("{}: {}", name, body),
                        None => name,
                    };
                    multi
                        .println(format!("      {} {}", "📎".dimmed(), line.dimmed()))
                        .ok();
                }

                TestEvent::Log { message } => {
                    multi.println(format!("      {}", message)).ok();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emitted_events_reach_subscribers() {
        let (emitter, mut receiver) = EventEmitter::new();
        emitter.emit(TestEvent::TestSkipped {
            name: "test_add_to_wishlist".to_string(),
            reason: "dependency did not pass".to_string(),
        });

        match receiver.recv().await.unwrap() {
            TestEvent::TestSkipped { name, .. } => assert_eq!(name, "test_add_to_wishlist"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn emitting_without_subscribers_is_harmless() {
        let emitter = EventEmitter::default();
        emitter.emit(TestEvent::Log {
            message: "nobody listening".to_string(),
        });
    }
}
