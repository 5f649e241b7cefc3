//! Prompt text.

/// Build the system message that seeds a transcript with a file's contents.
///
/// The data goes between `<` and `>` so the model can tell it apart from the
/// instruction.
pub fn build_system_prompt(file_name: &str, csv_data: &str) -> String {
    format!(
        "The following text enclosed in angle brackets, <>, is a CSV file named \"{file_name}\". \
The first line contains the column headings and the rest is the actual data.\n\n<{csv_data}>\n"
    )
}

/// Usage notes served alongside the page.
pub const INSTRUCTIONS: &str = "\
#### Instructions

Upload a CSV file and ask questions about it. You must first enter a valid \
OpenAI API key; it is kept only for the duration of your session and any \
usage is billed to your OpenAI account.

You could for example ask for a summary of the data, or for a calculation \
over its rows and columns, e.g. the total or average of a column. You can \
even ask for a report or article based on the data.

If the subject of the data is not clear from the table itself, say what it \
is about in a prompt, e.g. \"The data concerns the voting intentions of UK \
citizens in various age groups if there were to be another referendum on \
membership of the EU\".

Previous questions are remembered, so if an answer is not what you wanted \
you can refine the question in a follow-up. Loading a different file starts \
a fresh conversation.
";
