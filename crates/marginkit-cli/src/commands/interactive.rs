use anyhow::{anyhow, bail, Result};
use clap::Args;
use colored::Colorize;
use marginkit_core::{Field, PricingForm};
use marginkit_report::format::NumberFormat;
use marginkit_report::terminal;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::debug;

use super::Context;

#[derive(Args)]
pub struct InteractiveArgs {
    /// Start with advanced models visible
    #[arg(long)]
    pub advanced: bool,

    /// Initial model (defaults to the configured default)
    #[arg(long)]
    pub model: Option<String>,
}

const HELP: &str = "\
Commands:
  model <id>            select a model preset (`custom` for manual prices)
  advanced on|off       show or hide advanced models
  set <field> <value>   set a field; fields: price, requests, tokens-in,
                        tokens-out, cost-in, cost-out, fixed-costs,
                        other-variable, projected-users
  clear <field>         blank a field
  show                  print the form and the current result
  models                list visible models
  help                  this text
  quit                  leave";

#[derive(Debug, PartialEq)]
enum Command {
    Model(String),
    Advanced(bool),
    Set(Field, String),
    Clear(Field),
    Show,
    Models,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, tail) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let verb = verb.to_lowercase();
    let tail = tail.trim_start();
    let (arg, rest) = tail.split_once(char::is_whitespace).unwrap_or((tail, ""));
    let arg = Some(arg).filter(|s| !s.is_empty());
    let rest = rest.trim();

    let field = |arg: Option<&str>| -> Result<Field> {
        arg.ok_or_else(|| anyhow!("missing field name"))?
            .parse::<Field>()
            .map_err(|e| anyhow!(e))
    };

    let cmd = match verb.as_str() {
        "model" | "use" => Command::Model(arg.ok_or_else(|| anyhow!("usage: model <id>"))?.to_string()),
        "advanced" => match arg.map(str::to_lowercase).as_deref() {
            Some("on") | Some("true") | Some("yes") => Command::Advanced(true),
            Some("off") | Some("false") | Some("no") => Command::Advanced(false),
            _ => bail!("usage: advanced on|off"),
        },
        "set" => Command::Set(field(arg)?, rest.to_string()),
        "clear" | "unset" => Command::Clear(field(arg)?),
        "show" => Command::Show,
        "models" => Command::Models,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("unknown command '{}' (try `help`)", other),
    };
    Ok(Some(cmd))
}

fn print_form(form: &PricingForm<'_>, out: &mut impl Write) -> Result<()> {
    writeln!(out, "  {:<18} : {}", "model", form.selected_id().unwrap_or("-"))?;
    writeln!(out, "  {:<18} : {}", "advanced", if form.show_advanced() { "on" } else { "off" })?;
    for field in Field::ALL {
        let raw = form.field(field);
        writeln!(out, "  {:<18} : {}", field.to_string(), if raw.is_empty() { "-" } else { raw })?;
    }
    Ok(())
}

/// Apply one command; returns false when the session should end.
fn execute(form: &mut PricingForm<'_>, cmd: Command, nf: NumberFormat, out: &mut impl Write) -> Result<bool> {
    debug!(?cmd, "interactive command");
    match cmd {
        Command::Quit => return Ok(false),
        Command::Help => {
            writeln!(out, "{}", HELP)?;
            return Ok(true);
        }
        Command::Models => {
            let presets = form.visible_presets();
            write!(out, "{}", terminal::render_preset_list(&presets, form.selected_id(), nf))?;
            return Ok(true);
        }
        Command::Show => print_form(form, out)?,
        Command::Model(id) => {
            form.select(&id)?;
        }
        Command::Advanced(on) => form.set_show_advanced(on),
        Command::Set(field, value) => form.set_field(field, &value)?,
        Command::Clear(field) => form.clear_field(field)?,
    }
    writeln!(out, "{}", terminal::render_outcome(&form.evaluate(), form.selected_preset(), nf))?;
    Ok(true)
}

pub fn run(args: InteractiveArgs, ctx: &Context) -> Result<()> {
    let mut form = PricingForm::new(&ctx.catalog, &ctx.default_model);
    form.set_show_advanced(args.advanced || ctx.show_advanced);
    if let Some(model) = &args.model {
        form.select(model)?;
    }

    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    let mut stdout = io::stdout();
    if prompt {
        writeln!(stdout, "{}", "marginkit interactive · type `help` for commands".dimmed())?;
    }

    let mut lines = stdin.lock().lines();
    loop {
        if prompt {
            write!(stdout, "{} ", ">".cyan())?;
            stdout.flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;

        let keep_going = match parse_command(&line) {
            Ok(None) => true,
            Ok(Some(cmd)) => execute(&mut form, cmd, ctx.nf, &mut stdout).unwrap_or_else(|e| {
                eprintln!("{}: {:#}", "error".red().bold(), e);
                true
            }),
            Err(e) => {
                eprintln!("{}: {:#}", "error".red().bold(), e);
                true
            }
        };
        if !keep_going {
            break;
        }
    }
    Ok(())
}
