//! Spoken day summaries.
//!
//! [`compose`] builds the sentence; a [`Speaker`] says it. The only speaker
//! shipped is [`CommandSpeaker`], which runs a text-to-speech program.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use chrono::NaiveDate;
use tokio::process::{Child, Command};

use crate::datetime::Locale;
use crate::error::{WhatDayError, WhatDayResult};
use crate::event::Event;

/// Build the text read aloud for a day. `events` is the day's list in
/// display order; completed events are left out of the enumeration.
pub fn compose(events: &[&Event], date: NaiveDate, locale: Locale) -> String {
    if events.is_empty() {
        return match locale {
            Locale::Thai => "วันนี้ไม่มีกิจกรรมที่ต้องทำ".to_string(),
            Locale::English => "There is nothing to do today".to_string(),
        };
    }

    let open: Vec<&Event> = events.iter().copied().filter(|e| !e.completed).collect();
    let date_text = format!("{} {}", locale.day_label(date), locale.date_label(date));

    match locale {
        Locale::Thai => {
            let mut text = format!("สวัสดีค่ะ {date_text} ");
            if open.is_empty() {
                text.push_str("กิจกรรมทั้งหมดเสร็จเรียบร้อยแล้วค่ะ ยินดีด้วย!");
                return text;
            }
            text.push_str(&format!("คุณมี {} กิจกรรมที่ต้องทำ ", open.len()));
            for (i, event) in open.iter().enumerate() {
                text.push_str(&format!("รายการที่ {}: {} ", i + 1, event.title));
            }
            text.push_str("หมดแล้วค่ะ สู้ๆนะคะ!");
            text
        }
        Locale::English => {
            let mut text = format!("Hello! {date_text}. ");
            if open.is_empty() {
                text.push_str("Everything is done. Well done!");
                return text;
            }
            let noun = if open.len() == 1 { "event" } else { "events" };
            text.push_str(&format!("You have {} {noun} to do. ", open.len()));
            for (i, event) in open.iter().enumerate() {
                text.push_str(&format!("Item {}: {}. ", i + 1, event.title));
            }
            text.push_str("That's all. You've got this!");
            text
        }
    }
}

/// Something that can say text out loud.
pub trait Speaker {
    /// Start saying `text`, cutting off anything still being said.
    fn speak(&mut self, text: &str) -> impl Future<Output = WhatDayResult<()>>;

    /// Stop the current utterance, if any.
    fn stop(&mut self) -> impl Future<Output = ()>;

    /// Wait until the current utterance is finished.
    fn finish(&mut self) -> impl Future<Output = WhatDayResult<()>>;
}

/// Text-to-speech programs tried in order when none is configured.
const BACKENDS: &[&str] = &["espeak-ng", "espeak", "spd-say", "say"];

/// Roughly 0.9x the usual speaking rate of each backend.
const WORDS_PER_MINUTE: &str = "158";
const SPD_SAY_RATE: &str = "-10";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Backend {
    Espeak,
    SpdSay,
    Say,
    /// A user-configured program plus its fixed arguments; the text is
    /// appended as the last argument.
    Custom(Vec<String>),
}

/// Speaks by running an external program, one utterance at a time.
#[derive(Debug)]
pub struct CommandSpeaker {
    program: PathBuf,
    backend: Backend,
    locale: Locale,
    current: Option<Child>,
}

impl CommandSpeaker {
    /// Use `command` when given (a program name followed by arguments),
    /// otherwise the first known backend on `PATH`.
    pub fn detect(command: Option<&str>, locale: Locale) -> WhatDayResult<Self> {
        if let Some(command) = command.map(str::trim).filter(|c| !c.is_empty()) {
            return Self::with_command(command, locale);
        }

        for name in BACKENDS {
            if let Ok(program) = which::which(name) {
                tracing::debug!(backend = *name, "Using speech backend");
                let backend = match *name {
                    "spd-say" => Backend::SpdSay,
                    "say" => Backend::Say,
                    _ => Backend::Espeak,
                };
                return Ok(CommandSpeaker {
                    program,
                    backend,
                    locale,
                    current: None,
                });
            }
        }

        Err(WhatDayError::SpeechUnavailable)
    }

    pub fn with_command(command: &str, locale: Locale) -> WhatDayResult<Self> {
        let mut words = command.split_whitespace().map(str::to_string);
        let name = words.next().ok_or(WhatDayError::SpeechUnavailable)?;
        let program = which::which(&name)
            .map_err(|_| WhatDayError::Speech(format!("Speech command '{name}' not found")))?;

        Ok(CommandSpeaker {
            program,
            backend: Backend::Custom(words.collect()),
            locale,
            current: None,
        })
    }

    fn args(&self, text: &str) -> Vec<String> {
        let voice = self.locale.language_tag().to_string();
        let mut args: Vec<String> = match &self.backend {
            Backend::Espeak => vec!["-v".into(), voice, "-s".into(), WORDS_PER_MINUTE.into()],
            Backend::SpdSay => vec![
                "-w".into(),
                "-l".into(),
                voice,
                "-r".into(),
                SPD_SAY_RATE.into(),
            ],
            Backend::Say => vec!["-r".into(), WORDS_PER_MINUTE.into()],
            Backend::Custom(args) => args.clone(),
        };
        args.push(text.to_string());
        args
    }
}

impl Speaker for CommandSpeaker {
    async fn speak(&mut self, text: &str) -> WhatDayResult<()> {
        self.stop().await;

        let child = Command::new(&self.program)
            .args(self.args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                WhatDayError::Speech(format!("Failed to start {}: {e}", self.program.display()))
            })?;

        self.current = Some(child);
        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(mut child) = self.current.take() {
            if let Err(e) = child.kill().await {
                tracing::debug!("Speech process already gone: {e}");
            }
        }
    }

    async fn finish(&mut self) -> WhatDayResult<()> {
        let Some(mut child) = self.current.take() else {
            return Ok(());
        };

        let status = child.wait().await?;
        if !status.success() {
            return Err(WhatDayError::Speech(format!(
                "{} exited with status: {}",
                self.program.display(),
                status.code().unwrap_or(-1)
            )));
        }
        Ok(())
    }
}
