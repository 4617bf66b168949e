use flick_search::{SearchError, SearchMode};

pub const HELP: &str = "commands: phrase <text> | location <lat> <lon> | quit";

/// One line of interactive input.
#[derive(Debug, PartialEq)]
pub enum Line {
    Search(Result<SearchMode, SearchError>),
    Quit,
    Blank,
    Help,
}

pub fn parse_line(raw: &str) -> Line {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match verb.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => Line::Quit,
        "phrase" | "p" => Line::Search(Ok(SearchMode::phrase(rest))),
        "location" | "loc" | "l" => {
            let mut parts = rest.split_whitespace();
            let lat = parts.next().unwrap_or("");
            let lon = parts.next().unwrap_or("");
            Line::Search(SearchMode::from_location_text(lat, lon))
        }
        _ => Line::Help,
    }
}
