use crossterm::event::{poll, Event, KeyEvent, KeyEventKind};
use tokio::time::Duration;

/// Polls the terminal without blocking the runtime, yielding ticks in between
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(100), // 10 Hz for application ticks
        }
    }

    pub async fn next_event(&mut self) -> anyhow::Result<EventType> {
        // Check for terminal events without blocking first
        if poll(Duration::from_millis(0))? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(EventType::Key(key));
                }
                Event::Resize(w, h) => return Ok(EventType::Resize(w, h)),
                _ => return Ok(EventType::Other),
            }
        }

        // If no immediate event, let background requests progress and tick
        tokio::time::sleep(self.tick_rate).await;
        Ok(EventType::Tick)
    }
}

#[derive(Debug, Clone)]
pub enum EventType {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
    Other,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
