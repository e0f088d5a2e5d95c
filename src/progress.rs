use indicatif::{ProgressBar, ProgressStyle};

pub struct ProgressHelper;

impl ProgressHelper {
    pub fn create(len: u64) -> ProgressBar {
        let bar = ProgressBar::new(len);
        let style = ProgressStyle::with_template(
            "{spinner:.blue} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
        bar.set_style(style);
        bar
    }
}
