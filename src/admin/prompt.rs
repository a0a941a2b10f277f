//! Confirmation prompts for destructive admin commands

/// Asks the operator to confirm a destructive action
pub trait Confirm {
    /// Show `message` and return whether the operator accepted
    fn confirm(&mut self, message: &str) -> bool;
}

/// Prompt text for deleting a video that owns `quiz_count` questions
pub fn video_delete_message(title: &str, quiz_count: usize) -> String {
    if quiz_count == 0 {
        format!("Delete video \"{}\"?", title)
    } else {
        format!(
            "Delete video \"{}\"? Its {} quiz question{} will also be permanently deleted.",
            title,
            quiz_count,
            if quiz_count == 1 { "" } else { "s" }
        )
    }
}

/// Prompt text for deleting a single quiz question
pub fn quiz_delete_message(question: &str) -> String {
    format!("Delete quiz question \"{}\"?", question)
}

/// Test double that answers every prompt the same way and remembers what it was asked
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Scripted {
    pub answer: bool,
    pub asked: Vec<String>,
}

#[cfg(test)]
impl Scripted {
    pub fn accepting() -> Self {
        Self { answer: true, asked: Vec::new() }
    }

    pub fn declining() -> Self {
        Self { answer: false, asked: Vec::new() }
    }
}

#[cfg(test)]
impl Confirm for Scripted {
    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        self.answer
    }
}
