use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar over `len` items; hidden unless running in tui mode.
pub(crate) fn progress_bar(len: usize, msg: &'static str, tui: bool) -> ProgressBar {
    if !tui {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::default_bar()
        .template(
            "{msg} {spinner:.magenta}\n\
            [{elapsed_precise:.magenta}] |{bar:40.cyan/blue}| {human_pos}/{human_len} \
            [Rate: {per_sec:.magenta}, ETA: {eta:.blue}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    let pb = ProgressBar::new(len as u64).with_style(style);
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print a section heading in tui mode.
pub(crate) fn banner(name: &str, tui: bool) {
    if tui {
        println!(
            "{bar}\n{name:^40}\n{bar}",
            bar = "=".repeat(40),
            name = name.bold()
        );
    }
}

/// Print the closing line of a section in tui mode.
pub(crate) fn done(msg: &str, tui: bool) {
    if tui {
        println!("{msg} ... {}\n", "done".green());
    }
}
