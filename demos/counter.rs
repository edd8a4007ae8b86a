//! Counter demo - a component with state, painted to the terminal.
//!
//! Keys: `+`/`-` change the count, `q` or Ctrl+C quits.
//!
//! Run with: cargo run --example counter 2>trace.log
//! (set RUST_LOG=spark_fiber=trace to see the scheduler and commits)

use std::io::{self, Write, stdout};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use spark_fiber::renderer::terminal::input::{TerminalEvent, poll_event};
use spark_fiber::*;
use tracing_subscriber::EnvFilter;

fn counter() -> Component {
    Component::new("Counter", |hooks, _props, _children| {
        let (count, set_count) = hooks.use_state(0i64)?;

        let on_key = Callback::new(move |key| match key.as_str() {
            Some("+") => set_count.update(|c| c + 1),
            Some("-") => set_count.update(|c| c - 1),
            _ => {}
        });

        Ok(element!(
            "box",
            props! { "padding" => 1, "gap" => 1, "onKey" => on_key },
            element!("box", props! { "bold" => true }, "spark-fiber counter")?,
            element!("box", props! { "flexDirection" => "row", "gap" => 1 }, "count:", count)?,
            element!("box", props! { "dim" => true }, "+/- to change, q to quit")?
        )?)
    })
}

fn run(session: &mut RenderSession<TerminalHost>) -> Result<(), Box<dyn std::error::Error>> {
    let container = session.host().container();
    session.render(element!(counter())?, container);

    let slice = Duration::from_millis(8);
    let mut out = stdout();
    loop {
        if run_until_idle(session, slice)?.is_some() {
            session.host_mut().paint(&mut out)?;
        }

        match poll_event(Duration::from_millis(16))? {
            Some(TerminalEvent::Key(key)) if key == "q" || key == "Ctrl+c" => break,
            Some(TerminalEvent::Key(key)) => {
                session.host().dispatch_all("onKey", &Value::from(key));
            }
            Some(TerminalEvent::Resize(width, height)) => {
                session.host_mut().resize(width, height)?;
                session.host_mut().paint(&mut out)?;
            }
            _ => {}
        }
    }

    session.unmount()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let host = TerminalHost::new(TerminalConfig::from_terminal()?)?;
    let mut session = RenderSession::new(host, Config::default());

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, Hide)?;

    let result = run(&mut session);

    execute!(stdout(), Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    stdout().flush()?;
    result
}
