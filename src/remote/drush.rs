// ABOUTME: Builder for drush invocations on a target docroot.
// ABOUTME: Renders quoted command lines of the form `cd ROOT && DRUSH NAME ARGS --OPTIONS`.

use super::shell_line;

/// Locates drush for one target environment.
#[derive(Debug, Clone)]
pub struct Drush {
    root: String,
    executable: String,
}

impl Drush {
    pub fn new(root: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            executable: executable.into(),
        }
    }

    /// Start building a drush command.
    pub fn command(&self, name: &str) -> DrushCommand {
        DrushCommand {
            root: self.root.clone(),
            executable: self.executable.clone(),
            name: name.to_string(),
            args: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Run an arbitrary command line from the docroot.
    pub fn in_root<I, S>(&self, words: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        format!("cd {} && {}", shell_line([&self.root]), shell_line(words))
    }
}

/// A single drush invocation.
#[derive(Debug, Clone)]
pub struct DrushCommand {
    root: String,
    executable: String,
    name: String,
    args: Vec<String>,
    options: Vec<(String, Option<String>)>,
}

impl DrushCommand {
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn option(mut self, name: &str, value: impl Into<String>) -> Self {
        self.options.push((name.to_string(), Some(value.into())));
        self
    }

    pub fn flag(mut self, name: &str) -> Self {
        self.options.push((name.to_string(), None));
        self
    }

    /// Answer yes to every prompt.
    pub fn yes(self) -> Self {
        self.flag("yes")
    }

    pub fn verbose(self) -> Self {
        self.flag("verbose")
    }

    pub fn render(&self) -> String {
        let mut line = shell_line([&self.executable, &self.name]);
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_words::quote(arg));
        }
        // Only option values need quoting; the `--name=` prefix is plain.
        for (name, value) in &self.options {
            line.push_str(" --");
            line.push_str(name);
            if let Some(value) = value {
                line.push('=');
                line.push_str(&shell_words::quote(value));
            }
        }
        format!("cd {} && {}", shell_line([&self.root]), line)
    }
}

impl std::fmt::Display for DrushCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
