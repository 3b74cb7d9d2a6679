#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::Lines;
use tokio::sync::mpsc;

use crate::domain::models::Event;

/// Merges lines read from the terminal with events sent by background tasks.
pub struct EventsService<R> {
    lines: Lines<R>,
    events: mpsc::UnboundedReceiver<Event>,
    input_open: bool,
}

impl<R: AsyncBufRead + Unpin> EventsService<R> {
    pub fn new(reader: R, events: mpsc::UnboundedReceiver<Event>) -> EventsService<R> {
        return EventsService {
            lines: reader.lines(),
            events,
            input_open: true,
        };
    }

    fn close_input(&mut self) -> Option<Event> {
        self.input_open = false;
        return Some(Event::InputClosed());
    }

    /// Next event from either source. `InputClosed` is emitted once when input
    /// ends, after which only background events are returned. `None` once
    /// every sender is gone and input is closed.
    pub async fn next(&mut self) -> Option<Event> {
        if !self.input_open {
            return self.events.recv().await;
        }

        let event = tokio::select! {
            biased;

            event = self.events.recv() => event,
            line = self.lines.next_line() => match line {
                Ok(Some(line)) => Some(Event::InputLine(line)),
                Ok(None) => self.close_input(),
                Err(err) => {
                    tracing::error!(error = ?err, "Failed to read input");
                    self.close_input()
                }
            },
        };

        return event;
    }
}
