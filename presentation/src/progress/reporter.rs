//! Progress reporting for pipeline and escalation runs

use colored::Colorize;
use deliberation_application::ProgressNotifier;
use deliberation_domain::{Participant, Tier, TierResult};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with one bar per phase
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .map(|style| style.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn line(&self, text: String) {
        let _ = self.multi.println(text);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: &str, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(phase.to_string());
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.phase_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_task_complete(&self, _phase: &str, participant: &Participant, success: bool) {
        let Ok(slot) = self.phase_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), participant)
            } else {
                format!("{} {}", "x".red(), participant)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, phase: &str) {
        let Ok(mut slot) = self.phase_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.take() {
            pb.finish_with_message(format!("{} done", phase.green()));
        }
    }

    fn on_tier_start(&self, tier: Tier) {
        self.line(format!(
            "{} {} ({})",
            "->".cyan(),
            tier.to_string().bold(),
            tier.display_name()
        ));
    }

    fn on_tier_complete(&self, result: &TierResult, accepted: bool) {
        let verdict = if accepted {
            "accepted".green()
        } else if result.tier == Tier::Oversight {
            "flagged".red()
        } else {
            "escalating".yellow()
        };
        self.line(format!(
            "   {} confidence {} in {:.1}s: {}",
            result.tier,
            result.confidence,
            result.duration.as_secs_f64(),
            verdict
        ));
    }
}
