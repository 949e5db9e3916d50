use super::commands::UciCommand;

pub struct Encoder {}

impl Encoder {
    /// Renders a command as a single protocol line, without the terminator.
    pub fn encode(&self, command: &UciCommand) -> String {
        match command {
            UciCommand::Uci => "uci".to_string(),
            UciCommand::IsReady => "isready".to_string(),
            UciCommand::UciNewGame => "ucinewgame".to_string(),

            UciCommand::Position { fen } => format!("position fen {}", fen),
            UciCommand::Go(params) => {
                let mut line = String::from("go");
                if let Some(depth) = params.depth {
                    line.push_str(&format!(" depth {}", depth));
                }
                if let Some(move_time) = params.move_time {
                    line.push_str(&format!(" movetime {}", move_time));
                }
                if params.infinite {
                    line.push_str(" infinite");
                }
                line
            }

            UciCommand::Stop => "stop".to_string(),
            UciCommand::Quit => "quit".to_string(),
        }
    }
}
