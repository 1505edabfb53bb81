use std::{
    io::{IsTerminal, Write},
    time::Duration,
};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

pub const PROMPT: &str = ">> ";

pub(crate) fn print_running(text: &str) {
    print_colourful_prefix("Running", Color::Green, text)
}

pub(crate) fn print_finished(duration: Duration) {
    print_colourful_prefix("Finished", Color::Green, &format!("in {}", seconds(duration)))
}

pub(crate) fn print_expanding(text: &str) {
    print_colourful_prefix("Expanding", Color::Cyan, text)
}

pub fn seconds(duration: Duration) -> String {
    format!("{:.2}s", duration.as_millis() as f32 / 1000.)
}

pub fn print_colourful_prefix(prefix: &str, color: Color, text: &str) {
    let buffer_writer = stderr_buffer_writer();
    let mut buffer = buffer_writer.buffer();
    buffer
        .set_color(
            ColorSpec::new()
                .set_intense(true)
                .set_bold(true)
                .set_fg(Some(color)),
        )
        .expect("print_colourful_prefix");
    write!(buffer, "{prefix: >11}").expect("print_colourful_prefix");
    buffer
        .set_color(&ColorSpec::new())
        .expect("print_colourful_prefix");
    writeln!(buffer, " {text}").expect("print_colourful_prefix");
    buffer_writer.print(&buffer).expect("print_colourful_prefix");
}

pub fn stderr_buffer_writer() -> BufferWriter {
    BufferWriter::stderr(color_choice())
}

fn colour_forced() -> bool {
    match std::env::var("FORCE_COLOR") {
        Ok(force) => !force.is_empty(),
        Err(_) => false
    }
}

fn color_choice() -> ColorChoice {
    if colour_forced() {
        ColorChoice::Always
    } else if std::io::stderr().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Ends the process on Ctrl-C with the same farewell as end of input.
pub fn handle_interrupt() -> std::io::Result<()> {
    ctrlc::set_handler(|| {
        println!("\nSession ended");
        std::process::exit(0);
    })
    .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))
}

/// Prompts until a non-empty line is read. `None` means the session is
/// over: either `.exit` was typed or the input ran out.
pub fn read_line(stdin: &std::io::Stdin) -> std::io::Result<Option<String>> {
    loop {
        let mut input = String::new();

        print!("{PROMPT}");
        std::io::stdout().flush()?;

        if stdin.read_line(&mut input)? == 0 {
            println!("\nSession ended");
            return Ok(None);
        }

        if let Some('\n') = input.chars().next_back() {
            input.pop();
        }
        if let Some('\r') = input.chars().next_back() {
            input.pop();
        }

        match input.as_str() {
            "" => {},
            ".exit" => return Ok(None),
            _ => return Ok(Some(input))
        }
    }
}
