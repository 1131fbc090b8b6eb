use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, looks_like_email, Config};
use crate::rubric::ReviewLevel;

/// Line-oriented question/answer over any reader and writer, so the wizard
/// can be driven by a script in tests.
struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line).context("Failed to write to terminal")
    }

    /// Ask and return the trimmed answer. End of input is an error so a
    /// closed stdin cannot loop forever.
    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question).context("Failed to write to terminal")?;
        self.output.flush().context("Failed to flush stdout")?;
        let mut answer = String::new();
        let read = self
            .input
            .read_line(&mut answer)
            .context("Failed to read input")?;
        if read == 0 {
            anyhow::bail!("Input closed before the wizard finished");
        }
        Ok(answer.trim().to_string())
    }

    fn ask_or(&mut self, question: &str, default: &str) -> Result<String> {
        let answer = self.ask(&format!("{} [{}]: ", question, default))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    fn confirm(&mut self, question: &str, default_yes: bool) -> Result<bool> {
        let choices = if default_yes { "Y/n" } else { "y/N" };
        let answer = self.ask(&format!("{} [{}]: ", question, choices))?.to_lowercase();
        Ok(match answer.as_str() {
            "" => default_yes,
            "y" | "yes" => true,
            _ => false,
        })
    }

    /// Re-ask until `parse` accepts the answer
    fn ask_until<T>(
        &mut self,
        question: &str,
        default: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<T> {
        loop {
            let answer = self.ask_or(question, default)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(&format!("  Invalid: {}. Try again.", e))?,
            }
        }
    }
}

/// Interactive setup: asks for each config field, then writes config.yaml.
///
/// `default_path` overrides the suggested location of the config file.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    let stdin = std::io::stdin();
    let mut prompter = Prompter {
        input: stdin.lock(),
        output: std::io::stdout(),
    };
    let suggested = default_path.unwrap_or_else(get_config_path);

    let Some((config, path)) = collect_config(&mut prompter, &suggested)? else {
        prompter.say("Aborted.")?;
        return Ok(());
    };
    write_config(&config, &path)?;

    prompter.say("")?;
    prompter.say(&format!("Config written to {}", path.display()))?;
    prompter.say("Run `recitation-tracker` to open your class.")?;
    Ok(())
}

/// Ask every question. `None` when the user declines to overwrite an
/// existing file.
fn collect_config<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    suggested_path: &Path,
) -> Result<Option<(Config, PathBuf)>> {
    let defaults = Config::default();

    p.say("")?;
    p.say("Recitation Tracker setup")?;
    p.say("")?;

    p.say("Students and their sessions live in one JSON file.")?;
    let data_path = p.ask_or("Data file", &defaults.data_path().display().to_string())?;

    p.say("")?;
    p.say("New scoring sessions open on this rubric; it can be switched per session.")?;
    let default_level = p.ask_until("Default review level (basic/advanced)", "basic", |s| {
        s.parse::<ReviewLevel>()
    })?;

    p.say("")?;
    let report_dir = p.ask_or(
        "Folder for printed report cards",
        &defaults.report_dir().display().to_string(),
    )?;

    p.say("")?;
    p.say("Parent addresses are used when emailing a progress summary.")?;
    let mut parent_emails = BTreeMap::new();
    while p.confirm(
        if parent_emails.is_empty() {
            "Add a parent email?"
        } else {
            "Add another parent email?"
        },
        false,
    )? {
        let student = loop {
            let name = p.ask("  Student name: ")?;
            if !name.is_empty() {
                break name;
            }
            p.say("  A student name is required.")?;
        };
        let email = loop {
            let email = p.ask("  Parent email: ")?;
            if looks_like_email(&email) {
                break email;
            }
            p.say("  That does not look like an email address.")?;
        };
        parent_emails.insert(student, email);
    }

    p.say("")?;
    let flash_duration = p.ask_until("How long should status messages stay up?", "3s", |s| {
        humantime::parse_duration(s)
            .map(|_| s.to_string())
            .map_err(|e| e.to_string())
    })?;

    p.say("")?;
    let path = PathBuf::from(p.ask_or(
        "Save config to",
        &suggested_path.display().to_string(),
    )?);
    if path.exists()
        && !p.confirm(
            &format!("{} already exists. Overwrite?", path.display()),
            false,
        )?
    {
        return Ok(None);
    }

    let config = Config {
        data_path: Some(data_path),
        default_level: Some(default_level),
        report_dir: Some(report_dir),
        parent_emails,
        flash_duration: Some(flash_duration),
    };
    Ok(Some((config, path)))
}

fn write_config(config: &Config, path: &Path) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config to {}", path.display()))
}
