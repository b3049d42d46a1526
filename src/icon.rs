use std::path::PathBuf;

/// How long a launched tile stays ghosted, which sets how deep the fade-in
/// starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleTime {
    Fastest,
    Fast,
    #[default]
    Slow,
    Lame,
    Millis(u32),
}

impl IdleTime {
    pub fn millis(self) -> u32 {
        match self {
            IdleTime::Fastest => 250,
            IdleTime::Fast => 500,
            IdleTime::Slow => 5000,
            IdleTime::Lame => 10000,
            IdleTime::Millis(ms) => ms,
        }
    }

    /// Preset names are case-insensitive; anything that is neither a preset
    /// nor a positive number of milliseconds falls back to `Slow`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "fastest" => IdleTime::Fastest,
            "fast" => IdleTime::Fast,
            "slow" => IdleTime::Slow,
            "lame" => IdleTime::Lame,
            _ => match s.parse::<u32>() {
                Ok(ms) if ms > 0 => IdleTime::Millis(ms),
                _ => {
                    tracing::warn!(value = s, "unrecognised idle time; using slow");
                    IdleTime::Slow
                }
            },
        }
    }
}

/// Image/command pair shown as one dock tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRecord {
    pub image: PathBuf,
    pub command: String,
    /// Title patterns of the application's windows. A non-empty list makes
    /// the tile exclusive to one running instance.
    pub titles: Vec<String>,
    pub idle: IdleTime,
}

impl IconRecord {
    pub fn new(image: &str, command: &str, titles: &str, idle: IdleTime) -> Self {
        Self {
            image: PathBuf::from(expand_home(image)),
            command: expand_home(command),
            titles: split_titles(titles),
            idle,
        }
    }

    /// Parse an `IMAGE:COMMAND[:TITLE;TITLE...[:IDLE]]` record. Everything
    /// after `#` is a comment. Returns `None` for blank lines and records
    /// without a command field.
    pub fn parse(record: &str) -> Option<Self> {
        let record = match record.find('#') {
            Some(idx) => &record[..idx],
            None => record,
        };
        let record = record.trim();
        if record.is_empty() {
            return None;
        }

        let mut fields = record.splitn(4, ':');
        let image = fields.next().filter(|s| !s.is_empty())?;
        let command = fields.next()?;
        let titles = fields.next().unwrap_or("");
        let idle = fields.next().map(IdleTime::parse).unwrap_or_default();
        Some(Self::new(image, command, titles, idle))
    }

    pub fn is_exclusive(&self) -> bool {
        !self.titles.is_empty()
    }

    pub fn set_titles(&mut self, titles: &str) {
        self.titles = split_titles(titles);
    }

    pub fn set_image(&mut self, image: &str) {
        self.image = PathBuf::from(expand_home(image));
    }
}

fn split_titles(titles: &str) -> Vec<String> {
    titles
        .split(';')
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

pub(crate) fn expand_home(path: &str) -> String {
    match path.strip_prefix('~') {
        Some(rest) => match dirs_next::home_dir() {
            Some(home) => format!("{}{rest}", home.display()),
            None => path.to_owned(),
        },
        None => path.to_owned(),
    }
}

/// Parse every record of a resource file, skipping blanks and comments.
pub fn parse_records(content: &str) -> Vec<IconRecord> {
    content
        .lines()
        .filter_map(|line| {
            let record = IconRecord::parse(line);
            if record.is_none() && !line.trim().is_empty() && !line.trim_start().starts_with('#') {
                tracing::warn!(line, "ignoring malformed icon record");
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_record() {
        let rec = IconRecord::parse("/usr/share/xterm.png:xterm -bg black:XTerm;*xterm*:fast").unwrap();
        assert_eq!(rec.image, PathBuf::from("/usr/share/xterm.png"));
        assert_eq!(rec.command, "xterm -bg black");
        assert_eq!(rec.titles, vec!["XTerm".to_string(), "*xterm*".to_string()]);
        assert_eq!(rec.idle, IdleTime::Fast);
        assert!(rec.is_exclusive());
    }

    #[test]
    fn title_and_idle_are_optional() {
        let rec = IconRecord::parse("a.png:gimp").unwrap();
        assert!(rec.titles.is_empty());
        assert!(!rec.is_exclusive());
        assert_eq!(rec.idle, IdleTime::Slow);
    }

    #[test]
    fn empty_title_tokens_are_dropped() {
        let rec = IconRecord::parse("a.png:gimp:;;GIMP;:lame").unwrap();
        assert_eq!(rec.titles, vec!["GIMP".to_string()]);
        assert_eq!(rec.idle, IdleTime::Lame);
    }

    #[test]
    fn comments_and_blank_lines_yield_nothing() {
        assert!(IconRecord::parse("# just a comment").is_none());
        assert!(IconRecord::parse("   ").is_none());
        assert!(IconRecord::parse("missing-command.png").is_none());
        let rec = IconRecord::parse("a.png:xclock # the clock").unwrap();
        assert_eq!(rec.command, "xclock");
    }

    #[test]
    fn idle_time_accepts_presets_and_numbers() {
        assert_eq!(IdleTime::parse("FASTEST").millis(), 250);
        assert_eq!(IdleTime::parse("1200"), IdleTime::Millis(1200));
        assert_eq!(IdleTime::parse("0"), IdleTime::Slow);
        assert_eq!(IdleTime::parse("soon"), IdleTime::Slow);
    }

    #[test]
    fn home_is_expanded() {
        if let Some(home) = dirs_next::home_dir() {
            let rec = IconRecord::parse("~/icons/a.png:~/bin/run").unwrap();
            assert_eq!(rec.image, PathBuf::from(format!("{}/icons/a.png", home.display())));
            assert_eq!(rec.command, format!("{}/bin/run", home.display()));
        }
    }

    #[test]
    fn resource_file_skips_bad_lines() {
        let records = parse_records("# dock\na.png:xterm\n\nbroken\nb.png:gimp:GIMP*\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].titles, vec!["GIMP*".to_string()]);
    }
}
