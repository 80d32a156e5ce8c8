use std::borrow::Cow;
use std::time::Duration;

use crate::util::progress_logger::{ProgressLogger, ProgressSession};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProgressMode {
    Hidden,
    Visible,
}

/// A spinner (or bar, when the pass knows how much work it has) labelled with a pass name.
#[derive(Clone, Debug)]
pub struct PassBarLogger {
    pass: String,
    mode: ProgressMode,
}

pub fn bar(mode: ProgressMode, pass: impl ToString) -> PassBarLogger {
    PassBarLogger {
        pass: pass.to_string(),
        mode,
    }
}

#[derive(Clone, Debug)]
pub struct PassBarSession {
    bar: indicatif::ProgressBar,
    pass: String,
}

const TICK_STRINGS: &[&str] = &["⠉", "⠘", "⠰", "⠤", "⠆", "⠃", "✔"];

fn style_for(count: Option<usize>) -> indicatif::ProgressStyle {
    let style = match count {
        Some(_) => indicatif::ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{elapsed_precise}] [{bar:.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=> ")),
        None => indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed_precise}] {msg}"),
    };
    style
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
        .tick_strings(TICK_STRINGS)
}

impl ProgressLogger for PassBarLogger {
    type Session = PassBarSession;

    fn start_session(self, count: Option<usize>) -> Self::Session {
        let target = match self.mode {
            ProgressMode::Hidden => indicatif::ProgressDrawTarget::hidden(),
            ProgressMode::Visible => indicatif::ProgressDrawTarget::stderr(),
        };
        let bar =
            indicatif::ProgressBar::with_draw_target(count.map(|count| count as u64), target);
        bar.set_style(style_for(count));
        bar.set_message(Cow::Owned(self.pass.clone()));
        bar.enable_steady_tick(Duration::from_millis(100));
        PassBarSession {
            bar,
            pass: self.pass,
        }
    }
}

impl ProgressSession for PassBarSession {
    fn update(&mut self, inc: usize) {
        self.bar.inc(inc as u64);
    }

    fn finish(self) {
        self.bar
            .finish_with_message(format!("{} ({:.2?})", self.pass, self.bar.elapsed()));
    }
}
