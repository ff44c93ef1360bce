//! Interactive command loop driving the session.
//!
//! One command runs to completion before the next prompt is shown; the
//! session state has a single writer for its whole lifetime.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

use deck_core::{
    regenerate_description, run_interaction, Agent, Completion, ReferenceFetcher, SessionState,
};
use deck_tools::AgentStore;

const HELP: &str = "\
Commands:
  list             show the agent roster
  add <name>       create an agent (prompts for a description)
  talk <n>         send one interaction to agent n
  edit <n>         edit agent n's name and description
  regen <n>        regenerate agent n's description (staged, not committed)
  delete <n>       remove agent n from the roster and the store
  context          set the request fields folded into prompts
  show             print the discussion so far
  link <n>         print a download link for agent n's definition
  help             show this help
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List,
    Add(String),
    Talk(usize),
    Edit(usize),
    Regen(usize),
    Delete(usize),
    Context,
    Show,
    Link(usize),
    Help,
    Quit,
}

/// Parse one input line. Agent numbers are 1-based on the surface and
/// 0-based in the command.
fn parse(line: &str) -> std::result::Result<Command, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or_else(String::new)?;
    let rest = words.collect::<Vec<_>>().join(" ");

    let index = |rest: &str| -> std::result::Result<usize, String> {
        match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(format!("`{verb}` needs an agent number, e.g. `{verb} 1`")),
        }
    };

    match verb {
        "list" | "ls" => Ok(Command::List),
        "add" => Ok(Command::Add(rest)),
        "talk" | "t" => index(&rest).map(Command::Talk),
        "edit" => index(&rest).map(Command::Edit),
        "regen" => index(&rest).map(Command::Regen),
        "delete" | "rm" => index(&rest).map(Command::Delete),
        "context" => Ok(Command::Context),
        "show" => Ok(Command::Show),
        "link" => index(&rest).map(Command::Link),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("Unknown command `{other}`. Try `help`.")),
    }
}

pub async fn run(
    state: &mut SessionState,
    completion: &dyn Completion,
    fetcher: &dyn ReferenceFetcher,
    store: &AgentStore,
    api_key: Option<&str>,
) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    loop {
        let line = match editor.readline("agentdeck> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&line);

        let command = match parse(&line) {
            Ok(command) => command,
            Err(message) => {
                if !message.is_empty() {
                    println!("{message}");
                }
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::List => list(state),
            Command::Show => show(state),
            Command::Add(name) => add(state, store, &mut editor, name)?,
            Command::Context => edit_context(state, &mut editor)?,
            Command::Talk(index) => talk(state, completion, fetcher, api_key, index).await,
            Command::Edit(index) => edit(state, store, &mut editor, index)?,
            Command::Regen(index) => regen(state, completion, api_key, index).await,
            Command::Delete(index) => delete(state, store, index),
            Command::Link(index) => link(state, store, index),
        }
    }
    Ok(())
}

fn list(state: &SessionState) {
    if state.agents.is_empty() {
        println!("No agents have yet been created. Use `add <name>` to create one.");
        return;
    }
    println!("Your agents (talk <n> to interact):");
    for (i, agent) in state.agents.iter().enumerate() {
        let marker = if state.selected == Some(i) { "*" } else { " " };
        let staged = if agent.pending_description.is_some() {
            " (pending edit)"
        } else {
            ""
        };
        println!("{marker}{}. {}: {}{staged}", i + 1, agent.name, agent.description);
    }
}

fn show(state: &SessionState) {
    if state.transcript.is_empty() {
        println!("(no discussion yet)");
    } else {
        println!("{}", state.transcript.render());
    }
}

async fn talk(
    state: &mut SessionState,
    completion: &dyn Completion,
    fetcher: &dyn ReferenceFetcher,
    api_key: Option<&str>,
    index: usize,
) {
    match run_interaction(state, index, completion, fetcher, api_key).await {
        Ok(Some(reply)) => {
            let name = &state.form_agent_name;
            println!("\n{name}: {reply}\n");
        }
        Ok(None) => println!("No reply."),
        Err(err) => println!("{err}"),
    }
}

fn add(
    state: &mut SessionState,
    store: &AgentStore,
    editor: &mut DefaultEditor,
    name: String,
) -> Result<()> {
    let name = if name.is_empty() {
        match editor.readline("Name: ") {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(err) => return Err(err.into()),
        }
    } else {
        name
    };
    if name.is_empty() {
        println!("Agent name must not be empty.");
        return Ok(());
    }

    let description = match editor.readline("Description: ") {
        Ok(line) => line.trim().to_string(),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    let agent = Agent::new(name, description);
    if let Err(err) = store.save(&agent) {
        println!("{err}");
    }
    info!(agent = %agent.name, "agent created");
    state.add_agent(agent);
    Ok(())
}

fn edit(
    state: &mut SessionState,
    store: &AgentStore,
    editor: &mut DefaultEditor,
    index: usize,
) -> Result<()> {
    let (current_name, current_description) = match state.agent(index) {
        Ok(agent) => (agent.name.clone(), agent.display_description().to_string()),
        Err(err) => {
            println!("{err}");
            return Ok(());
        }
    };
    state.edit_index = Some(index);
    state.show_edit = true;

    let mut prompt_with = |label: &str, initial: &str| -> Result<Option<String>> {
        match editor.readline_with_initial(label, (initial, "")) {
            Ok(line) => Ok(Some(line.trim().to_string())),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    };

    let new_name = prompt_with("Name: ", &current_name)?;
    let new_description = match &new_name {
        Some(_) => prompt_with("Description: ", &current_description)?,
        None => None,
    };

    state.show_edit = false;
    state.edit_index = None;

    let (Some(new_name), Some(new_description)) = (new_name, new_description) else {
        println!("Edit cancelled.");
        return Ok(());
    };

    let Ok(agent) = state.agent_mut(index) else {
        return Ok(());
    };
    let old_name = agent.name.clone();
    if !new_name.is_empty() {
        agent.name = new_name;
    }
    agent.description = new_description;
    agent.discard_pending();

    let agent = agent.clone();
    if agent.name != old_name {
        if let Err(err) = store.remove(&old_name) {
            println!("{err}");
        }
    }
    match store.save(&agent) {
        Ok(()) => println!("Agent properties updated"),
        Err(err) => println!("{err}"),
    }
    Ok(())
}

async fn regen(
    state: &mut SessionState,
    completion: &dyn Completion,
    api_key: Option<&str>,
    index: usize,
) {
    match regenerate_description(state, index, completion, api_key).await {
        Ok(Some(text)) => {
            // Staged only; `edit` commits or discards it.
            if let Ok(agent) = state.agent_mut(index) {
                agent.stage_description(&text);
            }
            println!("Staged description: {text}");
        }
        Ok(None) => println!("Failed to regenerate description."),
        Err(err) => println!("{err}"),
    }
}

fn delete(state: &mut SessionState, store: &AgentStore, index: usize) {
    match state.remove_agent(index) {
        Ok(removed) => {
            match store.remove(&removed.name) {
                Ok(true) => {}
                Ok(false) => info!(agent = %removed.name, "no stored document to delete"),
                Err(err) => println!("{err}"),
            }
            println!("Deleted {}.", removed.name);
        }
        Err(err) => println!("{err}"),
    }
}

fn link(state: &SessionState, store: &AgentStore, index: usize) {
    match state.agent(index) {
        Ok(agent) => match store.download_link(agent) {
            Ok(link) => println!("{link}"),
            Err(err) => println!("{err}"),
        },
        Err(err) => println!("{err}"),
    }
}

fn edit_context(state: &mut SessionState, editor: &mut DefaultEditor) -> Result<()> {
    let fields = [
        ("Original request: ", state.user_request.clone()),
        ("Rephrased request: ", state.rephrased_request.clone()),
        ("Additional input: ", state.user_input.clone()),
        ("Reference URL: ", state.reference_url.clone()),
    ];

    let mut values = Vec::with_capacity(fields.len());
    for (label, initial) in &fields {
        match editor.readline_with_initial(label, (initial, "")) {
            Ok(line) => values.push(line.trim().to_string()),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Context unchanged.");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
    }

    let mut values = values.into_iter();
    state.user_request = values.next().unwrap_or_default();
    state.rephrased_request = values.next().unwrap_or_default();
    state.user_input = values.next().unwrap_or_default();
    state.reference_url = values.next().unwrap_or_default();
    Ok(())
}
