//! Command parsing for the admin console

use crate::catalog::VideoId;

/// Which of the two editors a command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Video,
    Quiz,
}

impl Target {
    fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "video" | "v" => Some(Target::Video),
            "quiz" | "q" => Some(Target::Quiz),
            _ => None,
        }
    }
}

/// A form field settable with `set <field> <value>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    VideoUrl,
    Description,
    Question,
    CorrectAnswer,
    Tag,
    Explanation,
}

impl Field {
    fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "title" => Some(Field::Title),
            "url" | "video_url" => Some(Field::VideoUrl),
            "description" | "desc" => Some(Field::Description),
            "question" => Some(Field::Question),
            "answer" | "correct" => Some(Field::CorrectAnswer),
            "tag" => Some(Field::Tag),
            "explanation" => Some(Field::Explanation),
            _ => None,
        }
    }
}

/// Parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List videos: videos
    Videos,
    /// Manage the quizzes of a video: select <video-id>
    Select(VideoId),
    /// List quizzes of the selected video: quizzes
    Quizzes,
    /// Start a fresh form: new video|quiz
    New(Target),
    /// Load a video into the video form: edit-video <video-id>
    EditVideo(VideoId),
    /// Load a quiz into the quiz form: edit-quiz <quiz-id>
    EditQuiz(String),
    /// Set a form field: set <field> <value>
    Set(Field, String),
    /// Set an answer option: option <1-4> <text>
    SetOption(usize, String),
    /// Show a form: show video|quiz
    Show(Target),
    /// Submit a form: save video|quiz
    Save(Target),
    /// Leave edit mode: cancel video|quiz
    Cancel(Target),
    /// Delete a video and its quizzes: delete-video <video-id>
    DeleteVideo(VideoId),
    /// Delete a quiz: delete-quiz <quiz-id>
    DeleteQuiz(String),
    /// End the session: sign-out
    SignOut,
    /// Show help: help or h
    Help,
    /// Leave the console: quit or q
    Quit,
    /// Empty line
    Nop,
}

/// Result of parsing a command
#[derive(Debug)]
pub enum ParseResult {
    /// Successfully parsed command
    Ok(Command),
    /// Unknown command
    UnknownCommand(String),
    /// Command needs an argument
    MissingArgument(String),
    /// Argument present but not understood
    InvalidArgument { command: String, argument: String },
}

fn with_target(cmd: &str, args: &str, build: fn(Target) -> Command) -> ParseResult {
    if args.is_empty() {
        return ParseResult::MissingArgument(cmd.to_string());
    }
    match Target::parse(args) {
        Some(target) => ParseResult::Ok(build(target)),
        None => ParseResult::InvalidArgument { command: cmd.to_string(), argument: args.to_string() },
    }
}

/// Parse a console line
pub fn parse_command(input: &str) -> ParseResult {
    let input = input.trim();

    if input.is_empty() {
        return ParseResult::Ok(Command::Nop);
    }

    // Split into command and arguments
    let mut parts = input.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim()).unwrap_or("");

    match cmd.to_lowercase().as_str() {
        "videos" | "ls" => ParseResult::Ok(Command::Videos),
        "quizzes" | "qs" => ParseResult::Ok(Command::Quizzes),
        "select" | "s" => {
            if args.is_empty() {
                ParseResult::MissingArgument("select".to_string())
            } else {
                ParseResult::Ok(Command::Select(VideoId::new(args)))
            }
        }
        "new" => with_target("new", args, Command::New),
        "show" => with_target("show", args, Command::Show),
        "save" => with_target("save", args, Command::Save),
        "cancel" => with_target("cancel", args, Command::Cancel),
        "edit-video" | "ev" => {
            if args.is_empty() {
                ParseResult::MissingArgument("edit-video".to_string())
            } else {
                ParseResult::Ok(Command::EditVideo(VideoId::new(args)))
            }
        }
        "edit-quiz" | "eq" => {
            if args.is_empty() {
                ParseResult::MissingArgument("edit-quiz".to_string())
            } else {
                ParseResult::Ok(Command::EditQuiz(args.to_string()))
            }
        }
        "set" => {
            let mut fields = args.splitn(2, char::is_whitespace);
            let name = fields.next().unwrap_or("");
            let value = fields.next().map(str::trim).unwrap_or("");
            if name.is_empty() {
                return ParseResult::MissingArgument("set".to_string());
            }
            match Field::parse(name) {
                // An empty value clears the field.
                Some(field) => ParseResult::Ok(Command::Set(field, value.to_string())),
                None => ParseResult::InvalidArgument {
                    command: "set".to_string(),
                    argument: name.to_string(),
                },
            }
        }
        "option" | "opt" => {
            let mut fields = args.splitn(2, char::is_whitespace);
            let number = fields.next().unwrap_or("");
            let text = fields.next().map(str::trim).unwrap_or("");
            if number.is_empty() {
                return ParseResult::MissingArgument("option".to_string());
            }
            match number.parse::<usize>() {
                Ok(n @ 1..=4) => ParseResult::Ok(Command::SetOption(n - 1, text.to_string())),
                _ => ParseResult::InvalidArgument {
                    command: "option".to_string(),
                    argument: number.to_string(),
                },
            }
        }
        "delete-video" | "dv" => {
            if args.is_empty() {
                ParseResult::MissingArgument("delete-video".to_string())
            } else {
                ParseResult::Ok(Command::DeleteVideo(VideoId::new(args)))
            }
        }
        "delete-quiz" | "dq" => {
            if args.is_empty() {
                ParseResult::MissingArgument("delete-quiz".to_string())
            } else {
                ParseResult::Ok(Command::DeleteQuiz(args.to_string()))
            }
        }
        "sign-out" | "logout" => ParseResult::Ok(Command::SignOut),
        "quit" | "q" | "exit" => ParseResult::Ok(Command::Quit),
        "help" | "h" | "?" => ParseResult::Ok(Command::Help),
        _ => ParseResult::UnknownCommand(cmd.to_string()),
    }
}

/// Console help text
pub const HELP: &str = "\
videos                      list videos
select <video-id>           manage the quizzes of a video
quizzes                     list quizzes of the selected video
new video|quiz              start a fresh form
edit-video <video-id>       load a video into the video form
edit-quiz <quiz-id>         load a quiz into the quiz form
set <field> <value>         title, url, description | question, answer, tag, explanation
option <1-4> <text>         set an answer option of the quiz form
show video|quiz             print a form
save video|quiz             create or update from a form
cancel video|quiz           leave edit mode and clear a form
delete-video <video-id>     delete a video and all of its quizzes
delete-quiz <quiz-id>       delete a quiz question
sign-out                    end the admin session
quit                        leave the console";
