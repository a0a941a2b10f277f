//! Command-line front end: catalog, playback, progress and the admin console

pub mod command;
pub mod state;

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::admin::{
    AdminConsole, AdminError, CascadeOutcome, Confirm, EditController, Mode, QuizForm, Saved,
    VideoForm,
};
use crate::auth::{IdentityProvider, SignIn};
use crate::catalog::{Catalog, CatalogEntry, Video, VideoId};
use crate::config::progress::LearningRecords;
use crate::quiz::{Grade, Playback, QuizQuestion, Review};
use crate::store::DocumentStore;
use command::{Command, Field, ParseResult, Target};
pub use state::AppState;

const WIDTH: usize = 78;

fn indented(text: &str) -> String {
    let options = textwrap::Options::new(WIDTH).initial_indent("    ").subsequent_indent("    ");
    textwrap::fill(text, options)
}

/// Print a prompt and read one line; `None` at end of input
fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Confirmation prompts answered on the terminal
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        match read_line(&format!("{} [y/N] ", message)) {
            Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}

/// Render catalog search results with their progress badges
pub fn render_catalog(entries: &[CatalogEntry<'_>], term: &str) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "[{}] {}  ({})", entry.status, entry.video.title, entry.video.id);
        if !entry.video.description.is_empty() {
            let _ = writeln!(out, "{}", indented(&entry.video.description));
        }
    }

    match (entries.len(), term.is_empty()) {
        (0, true) => out.push_str("The catalog is empty."),
        (0, false) => {
            let _ = write!(out, "No videos match \"{}\".", term);
        }
        (1, _) => out.push_str("1 video"),
        (n, _) => {
            let _ = write!(out, "{} videos", n);
        }
    }
    out
}

/// Render the local learning records
pub fn render_progress(records: &LearningRecords) -> String {
    if records.is_empty() {
        return "No quizzes taken yet.".to_string();
    }

    let mut out = String::new();
    for (video, record) in records.iter() {
        let _ = writeln!(
            out,
            "{}  {}/{}{}  {}",
            video,
            record.score,
            record.total,
            if record.passed { " passed" } else { "" },
            record.date.format("%Y-%m-%d %H:%M UTC")
        );
    }
    out.trim_end().to_string()
}

fn render_question(number: usize, question: &QuizQuestion) -> String {
    let mut out = textwrap::fill(&format!("{}. {}", number, question.question), WIDTH);
    for (i, option) in question.options.iter().enumerate() {
        let _ = write!(out, "\n   {}) {}", i + 1, option);
    }
    out
}

/// Render a grade with its weakness hint and per-question feedback
pub fn render_grade(grade: &Grade, reviews: &[Review<'_>]) -> String {
    let mut out = format!("Score: {}/{}\n", grade.score, grade.total);
    if grade.passed() {
        out.push_str("Full marks. This video is complete.\n");
    } else if let Some(tag) = &grade.weakest_tag {
        let _ = writeln!(out, "You may want to review: {}", tag);
    }

    for (i, review) in reviews.iter().enumerate() {
        let verdict = if review.correct { "correct" } else { "incorrect" };
        let _ = write!(out, "\n{}. {} ({})", i + 1, review.question.question, verdict);
        if !review.correct {
            let _ = write!(out, "\n   Answer: {}", review.correct_option());
        }
        if !review.explanation().is_empty() {
            let _ = write!(out, "\n{}", indented(review.explanation()));
        }
    }
    out
}

fn render_videos(videos: &[Video]) -> String {
    if videos.is_empty() {
        return "No videos.".to_string();
    }
    videos.iter().map(|v| format!("{}  {}", v.id, v.title)).collect::<Vec<_>>().join("\n")
}

fn render_quizzes(quizzes: &[QuizQuestion]) -> String {
    if quizzes.is_empty() {
        return "No quizzes for this video.".to_string();
    }
    quizzes
        .iter()
        .map(|q| {
            let tag = q.tag().map(|t| format!(" [{}]", t)).unwrap_or_default();
            format!("{}  {}{}", q.id, q.question, tag)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_mode(mode: &Mode, entity: &str) -> String {
    match mode {
        Mode::Create => format!("New {}", entity),
        Mode::Edit(id) => format!("Editing {} {}", entity, id),
    }
}

fn render_video_form(editor: &EditController<VideoForm>) -> String {
    let form = editor.form();
    format!(
        "{}\n  title:       {}\n  url:         {}\n  description: {}",
        render_mode(editor.mode(), "video"),
        form.title,
        form.video_url,
        form.description
    )
}

fn render_quiz_form(editor: &EditController<QuizForm>) -> String {
    let form = editor.form();
    let mut out = format!("{}\n  question:    {}", render_mode(editor.mode(), "quiz"), form.question);
    for (i, option) in form.options.iter().enumerate() {
        let marker = if usize::from(form.correct_answer) == i { "*" } else { " " };
        let _ = write!(out, "\n  {}option {}:   {}", marker, i + 1, option);
    }
    let _ = write!(out, "\n  tag:         {}\n  explanation: {}", form.tag, form.explanation);
    out
}

fn describe_saved(entity: &str, saved: &Saved) -> String {
    match saved {
        Saved::Created(id) => format!("Created {} {}.", entity, id),
        Saved::Updated(id) => format!("Updated {} {}.", entity, id),
    }
}

/// Run one console command against the admin console and describe the result
pub async fn execute<S: DocumentStore>(
    console: &mut AdminConsole,
    store: &S,
    command: Command,
    confirm: &mut impl Confirm,
) -> Result<String, AdminError> {
    match command {
        Command::Videos => {
            console.refresh_videos(store).await?;
            Ok(render_videos(console.videos()))
        }
        Command::Select(video) => {
            console.select_video(store, &video).await?;
            Ok(format!("Selected {}.\n{}", video, render_quizzes(console.quizzes())))
        }
        Command::Quizzes => {
            if console.selected().is_none() {
                return Err(AdminError::NoVideoSelected);
            }
            console.refresh_quizzes(store).await?;
            Ok(render_quizzes(console.quizzes()))
        }
        Command::New(Target::Video) => {
            console.cancel_video_edit();
            Ok(render_video_form(console.video_editor()))
        }
        Command::New(Target::Quiz) => {
            if console.selected().is_none() {
                return Err(AdminError::NoVideoSelected);
            }
            console.cancel_quiz_edit();
            Ok(render_quiz_form(console.quiz_editor()))
        }
        Command::EditVideo(video) => {
            console.start_video_edit(&video)?;
            Ok(render_video_form(console.video_editor()))
        }
        Command::EditQuiz(quiz) => {
            console.start_quiz_edit(&quiz)?;
            Ok(render_quiz_form(console.quiz_editor()))
        }
        Command::Set(field, value) => {
            match field {
                Field::Title => console.video_editor_mut().form_mut().title = value,
                Field::VideoUrl => console.video_editor_mut().form_mut().video_url = value,
                Field::Description => console.video_editor_mut().form_mut().description = value,
                Field::Question => console.quiz_editor_mut().form_mut().question = value,
                Field::CorrectAnswer => console.quiz_editor_mut().form_mut().set_correct_answer(&value)?,
                Field::Tag => console.quiz_editor_mut().form_mut().tag = value,
                Field::Explanation => console.quiz_editor_mut().form_mut().explanation = value,
            }
            Ok(String::new())
        }
        Command::SetOption(index, text) => {
            console.quiz_editor_mut().form_mut().set_option(index, text)?;
            Ok(String::new())
        }
        Command::Show(Target::Video) => Ok(render_video_form(console.video_editor())),
        Command::Show(Target::Quiz) => Ok(render_quiz_form(console.quiz_editor())),
        Command::Save(Target::Video) => {
            let saved = console.submit_video(store).await?;
            Ok(describe_saved("video", &saved))
        }
        Command::Save(Target::Quiz) => {
            let saved = console.submit_quiz(store).await?;
            Ok(describe_saved("quiz", &saved))
        }
        Command::Cancel(Target::Video) => {
            console.cancel_video_edit();
            Ok("Video form cleared.".to_string())
        }
        Command::Cancel(Target::Quiz) => {
            console.cancel_quiz_edit();
            Ok("Quiz form cleared.".to_string())
        }
        Command::DeleteVideo(video) => match console.delete_video(store, &video, confirm).await? {
            CascadeOutcome::Declined => Ok("Nothing deleted.".to_string()),
            CascadeOutcome::Deleted { quizzes_removed: 0 } => Ok(format!("Deleted video {}.", video)),
            CascadeOutcome::Deleted { quizzes_removed } => {
                Ok(format!("Deleted video {} and {} quiz questions.", video, quizzes_removed))
            }
        },
        Command::DeleteQuiz(quiz) => {
            if console.delete_quiz(store, &quiz, confirm).await? {
                Ok(format!("Deleted quiz {}.", quiz))
            } else {
                Ok("Nothing deleted.".to_string())
            }
        }
        Command::SignOut | Command::Help | Command::Quit | Command::Nop => Ok(String::new()),
    }
}

/// Print the catalog, optionally narrowed by a search term
pub async fn run_catalog<S: DocumentStore, P>(state: &AppState<S, P>, term: &str) -> Result<()> {
    let catalog = Catalog::load(&state.store).await?;
    let entries = catalog.search(term, &state.records);
    println!("{}", render_catalog(&entries, term));
    Ok(())
}

/// Print locally stored progress
pub fn run_progress(records: &LearningRecords) {
    println!("{}", render_progress(records));
}

/// Show one video and take its quiz on the terminal
pub async fn run_watch<S: DocumentStore, P>(state: &mut AppState<S, P>, video: &VideoId) -> Result<()> {
    let mut playback = Playback::open(&state.store, video).await?;

    let shown = playback.video();
    println!("{}\n{}", shown.title, shown.video_url);
    if !shown.description.is_empty() {
        println!("{}", indented(&shown.description));
    }

    let Some(session) = playback.quiz(&state.store).await? else {
        println!("\nThis video has no quiz.");
        return Ok(());
    };

    loop {
        println!("\nQuiz: answer 1-{} per question, Enter to skip.", crate::quiz::OPTION_COUNT);
        for i in 0..session.questions().len() {
            println!("\n{}", render_question(i + 1, &session.questions()[i]));
            loop {
                let Some(answer) = read_line("> ")? else {
                    return Ok(());
                };
                let answer = answer.trim();
                if answer.is_empty() {
                    break;
                }
                let selected = answer.parse::<u8>().ok().and_then(|n| n.checked_sub(1));
                match selected.map(|option| session.select(i, option)) {
                    Some(Ok(())) => break,
                    Some(Err(e)) => println!("{}", e),
                    None => println!("Enter an option number."),
                }
            }
        }

        let grade = session.submit(&mut state.records)?;
        let reviews = session.review().unwrap_or_default();
        println!("\n{}", render_grade(&grade, &reviews));

        if !TerminalConfirm.confirm("\nTry again?") {
            return Ok(());
        }
        session.reset();
    }
}

/// Sign in and run the admin console until the operator quits or signs out
pub async fn run_admin<S: DocumentStore, P: IdentityProvider>(
    state: &mut AppState<S, P>,
    request: SignIn,
) -> Result<()> {
    state.gate.sign_in(&state.store, &request).await?;
    let label = state.gate.principal().map(|p| p.display_label().to_string()).unwrap_or_default();

    if !state.gate.is_admin() {
        println!("Signed in as {}. This account does not have admin access.", label);
        if let Some(line) = read_line("Type sign-out to end the session, or press Enter to leave: ")? {
            if matches!(command::parse_command(&line), ParseResult::Ok(Command::SignOut)) {
                state.sign_out()?;
                println!("Signed out.");
            }
        }
        return Ok(());
    }
    println!("Signed in as {} (admin).", label);

    let console = state.gate.console()?;
    console.refresh_videos(&state.store).await?;
    println!("{}\nType help for commands.", render_videos(console.videos()));

    while let Some(line) = read_line("admin> ")? {
        let command = match command::parse_command(&line) {
            ParseResult::Ok(command) => command,
            ParseResult::UnknownCommand(cmd) => {
                println!("Unknown command: {}. Type help for a list.", cmd);
                continue;
            }
            ParseResult::MissingArgument(cmd) => {
                println!("{} needs an argument. Type help for usage.", cmd);
                continue;
            }
            ParseResult::InvalidArgument { command, argument } => {
                println!("{}: cannot use {:?}. Type help for usage.", command, argument);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::SignOut => {
                state.sign_out()?;
                println!("Signed out.");
                break;
            }
            Command::Help => println!("{}", command::HELP),
            Command::Nop => {}
            command => {
                let console = state.gate.console()?;
                match execute(console, &state.store, command, &mut TerminalConfirm).await {
                    Ok(output) if output.is_empty() => {}
                    Ok(output) => println!("{}", output),
                    Err(e) => {
                        tracing::error!("command {:?} failed: {}", line.trim(), e);
                        if e.is_recoverable() {
                            println!("{} You can retry the command.", e);
                        } else {
                            println!("{}", e);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
