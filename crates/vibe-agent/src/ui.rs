//! The orchestrator talks to its surrounding terminal (or test harness)
//! only through this trait, so the plan/act/verify/repair loop can be
//! exercised without a real stdin/stdout.

use std::io::Write as _;

pub trait Ui: Send {
    fn show_message(&mut self, message: &str);
    fn show_plan(&mut self, steps: &[String]);
    fn show_tool_result(&mut self, tool: &str, ok: bool, summary: &str);
    fn ask_question(&mut self, question: &str) -> String;
    fn confirm_rollback(&mut self, changed_paths: &[String]) -> bool;
    fn approve_write(&mut self, path: &str, diff: &str) -> bool;
}

/// Plain stdin/stdout implementation used by the binary.
pub struct StdIoUi;

impl Ui for StdIoUi {
    fn show_message(&mut self, message: &str) {
        if !message.is_empty() {
            println!("{message}");
        }
    }

    fn show_plan(&mut self, steps: &[String]) {
        if steps.is_empty() {
            return;
        }
        println!("Plan:");
        for (i, step) in steps.iter().enumerate() {
            println!("  {}. {step}", i + 1);
        }
    }

    fn show_tool_result(&mut self, tool: &str, ok: bool, summary: &str) {
        let marker = if ok { "ok" } else { "FAILED" };
        println!("[{tool}] {marker}: {summary}");
    }

    fn ask_question(&mut self, question: &str) -> String {
        println!("{question}");
        print!("> ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).ok();
        line.trim().to_string()
    }

    fn confirm_rollback(&mut self, changed_paths: &[String]) -> bool {
        println!(
            "Verification failed and {} file(s) were changed this task: {}",
            changed_paths.len(),
            changed_paths.join(", ")
        );
        let answer = self.ask_question("Roll back all changes? [y/N]");
        matches!(answer.to_lowercase().as_str(), "y" | "yes")
    }

    fn approve_write(&mut self, path: &str, diff: &str) -> bool {
        println!("Proposed write to {path}:");
        println!("{diff}");
        let answer = self.ask_question("Apply this write? [y/N]");
        matches!(answer.to_lowercase().as_str(), "y" | "yes")
    }
}

#[cfg(test)]
pub mod test_support {
    use super::Ui;

    /// A scripted, non-interactive `Ui` for orchestrator tests. Answers
    /// and approvals are consumed in order; a missing entry defaults to
    /// decline/empty so a test that under-specifies scripts fails loudly
    /// via assertions rather than hanging.
    #[derive(Default)]
    pub struct ScriptedUi {
        pub answers: Vec<String>,
        pub approvals: Vec<bool>,
        pub rollback_decisions: Vec<bool>,
        pub messages: Vec<String>,
        pub tool_results: Vec<(String, bool, String)>,
    }

    impl Ui for ScriptedUi {
        fn show_message(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }

        fn show_plan(&mut self, steps: &[String]) {
            for step in steps {
                self.messages.push(format!("plan: {step}"));
            }
        }

        fn show_tool_result(&mut self, tool: &str, ok: bool, summary: &str) {
            self.tool_results
                .push((tool.to_string(), ok, summary.to_string()));
        }

        fn ask_question(&mut self, _question: &str) -> String {
            if self.answers.is_empty() {
                String::new()
            } else {
                self.answers.remove(0)
            }
        }

        fn confirm_rollback(&mut self, _changed_paths: &[String]) -> bool {
            if self.rollback_decisions.is_empty() {
                false
            } else {
                self.rollback_decisions.remove(0)
            }
        }

        fn approve_write(&mut self, _path: &str, _diff: &str) -> bool {
            if self.approvals.is_empty() {
                false
            } else {
                self.approvals.remove(0)
            }
        }
    }
}
