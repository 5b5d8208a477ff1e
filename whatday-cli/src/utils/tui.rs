use anyhow::Result;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Prompt until `parse` accepts the input. Empty answers are passed to
/// `parse` too, so it decides whether a field is optional.
pub fn prompt_with_retry<T, F>(prompt: &str, default: Option<&str>, parse: F) -> Result<T>
where
    F: Fn(&str) -> Result<T>,
{
    loop {
        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .default(default.unwrap_or_default().to_string())
            .show_default(default.is_some_and(|d| !d.is_empty()))
            .interact_text()?;

        match parse(answer.trim()) {
            Ok(result) => return Ok(result),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

/// Free-text prompt that may be left empty.
pub fn prompt_optional(prompt: &str) -> Result<String> {
    let answer: String = Input::new()
        .with_prompt(prompt)
        .default(String::new())
        .show_default(false)
        .interact_text()?;
    Ok(answer.trim().to_string())
}
