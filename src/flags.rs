use crate::error::ShellError;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: BTreeMap<String, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: Option<String>,
    pub long: String,
    pub description: String,
    pub takes_value: bool,
    pub value: Option<String>,
}

impl Flag {
    fn new(short: Option<&str>, long: &str, description: &str, takes_value: bool) -> Self {
        Flag {
            short: short.map(str::to_string),
            long: long.to_string(),
            description: description.to_string(),
            takes_value,
            value: None,
        }
    }

    fn matches(&self, arg: &str) -> bool {
        arg == self.long || self.short.as_deref() == Some(arg)
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let mut flags = BTreeMap::new();

        // `-h` names the history file, so help only has a long form
        flags.insert(
            "help".to_string(),
            Flag::new(None, "--help", "Print this help message", false),
        );
        flags.insert(
            "version".to_string(),
            Flag::new(Some("-v"), "--version", "Show version information", false),
        );
        flags.insert(
            "history".to_string(),
            Flag::new(
                Some("-h"),
                "--history",
                "Load history from FILE and save it back on exit",
                true,
            ),
        );
        flags.insert(
            "file".to_string(),
            Flag::new(Some("-f"), "--file", "Read commands from script FILE", true),
        );
        flags.insert(
            "quiet".to_string(),
            Flag::new(Some("-q"), "--quiet", "Suppress error colouring and warnings", false),
        );
        flags.insert(
            "debug".to_string(),
            Flag::new(Some("-d"), "--debug", "Enable debug output", false),
        );

        Flags { flags }
    }

    pub fn parse(&mut self, args: &[String]) -> Result<(), ShellError> {
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];

            let flag = self
                .flags
                .values_mut()
                .find(|flag| flag.matches(arg))
                .ok_or_else(|| ShellError::Flag(format!("Unknown argument {}", arg)))?;

            if flag.value.is_some() {
                return Err(ShellError::Flag(format!("Flag {} given more than once", arg)));
            }

            if flag.takes_value {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| ShellError::Flag(format!("Flag {} requires a value", arg)))?;
                flag.value = Some(value.clone());
                i += 1;
            } else {
                flag.value = Some("true".to_string());
            }
            i += 1;
        }
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags
            .get(name)
            .and_then(|f| f.value.as_ref())
            .is_some()
    }

    pub fn get_value(&self, name: &str) -> Option<&String> {
        self.flags.get(name).and_then(|f| f.value.as_ref())
    }

    pub fn usage() -> &'static str {
        "recall [-h <history_file>] [-f <command_file>]"
    }

    pub fn print_help(&self) {
        println!("Usage: {}", Self::usage());
        println!("\nOptions:");
        for flag in self.flags.values() {
            let short = flag.short.as_deref().unwrap_or("  ");
            let long = if flag.takes_value {
                format!("{} FILE", flag.long)
            } else {
                flag.long.clone()
            };
            println!("  {}, {:<16} {}", short, long, flag.description);
        }
    }
}
