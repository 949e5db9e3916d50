use super::commands::{Score, UciOutput};
use super::is_null_move;

pub struct Decoder;

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, input: &str) -> UciOutput {
        let tokens: Vec<&str> = input.split_whitespace().collect();

        match tokens.first().copied() {
            Some("bestmove") => self.decode_bestmove(&tokens),
            Some("uciok") => UciOutput::UciOk,
            Some("readyok") => UciOutput::ReadyOk,

            _ => match extract_score(&tokens) {
                Some(score) => UciOutput::Score(score),
                None => UciOutput::Other(input.trim().to_string()),
            },
        }
    }

    fn decode_bestmove(&self, tokens: &[&str]) -> UciOutput {
        // A bare "bestmove" line is treated the same as "bestmove (none)"
        let best_move = tokens
            .get(1)
            .filter(|mv| !is_null_move(mv))
            .map(|mv| mv.to_string());

        let ponder = tokens
            .windows(2)
            .skip(1)
            .find(|w| w[0] == "ponder")
            .map(|w| w[1].to_string());

        UciOutput::BestMove { best_move, ponder }
    }
}

/// Finds the last `score cp|mate <n>` triple in a tokenised line.
fn extract_score(tokens: &[&str]) -> Option<Score> {
    tokens
        .windows(3)
        .filter(|w| w[0] == "score")
        .filter_map(|w| {
            let value = w[2].parse::<i32>().ok()?;
            match w[1] {
                "cp" => Some(Score::Centipawns(value)),
                "mate" => Some(Score::Mate(value)),
                _ => None,
            }
        })
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_outputs() {
        assert!(matches!(Decoder.decode("uciok"), UciOutput::UciOk));
        assert!(matches!(Decoder.decode("readyok"), UciOutput::ReadyOk));
        assert!(matches!(
            Decoder.decode("id name Stockfish 16"),
            UciOutput::Other(_)
        ));
    }

    #[test]
    fn test_bestmove() {
        let UciOutput::BestMove { best_move, ponder } = Decoder.decode("bestmove e7e5") else {
            panic!("Expected BestMove")
        };
        assert_eq!(best_move.as_deref(), Some("e7e5"));
        assert!(ponder.is_none());
    }

    #[test]
    fn test_bestmove_with_ponder() {
        let UciOutput::BestMove { best_move, ponder } =
            Decoder.decode("bestmove e2e4 ponder c7c5")
        else {
            panic!("Expected BestMove")
        };
        assert_eq!(best_move.as_deref(), Some("e2e4"));
        assert_eq!(ponder.as_deref(), Some("c7c5"));
    }

    #[test]
    fn test_bestmove_promotion() {
        let UciOutput::BestMove { best_move, .. } = Decoder.decode("bestmove a7a8q") else {
            panic!("Expected BestMove")
        };
        assert_eq!(best_move.as_deref(), Some("a7a8q"));
    }

    #[test]
    fn test_bestmove_none() {
        for line in ["bestmove (none)", "bestmove 0000", "bestmove"] {
            let UciOutput::BestMove { best_move, .. } = Decoder.decode(line) else {
                panic!("Expected BestMove for {:?}", line)
            };
            assert!(best_move.is_none(), "{:?} should carry no move", line);
        }
    }

    #[test]
    fn test_score_centipawns() {
        let line = "info depth 12 seldepth 18 multipv 1 score cp 20 nodes 80312 nps 1200000 pv e7e5";
        assert_eq!(Decoder.decode(line), UciOutput::Score(Score::Centipawns(20)));
    }

    #[test]
    fn test_score_mate() {
        let line = "info depth 30 score mate -3 nodes 12 pv g8h8";
        assert_eq!(Decoder.decode(line), UciOutput::Score(Score::Mate(-3)));
    }

    #[test]
    fn test_score_with_bound() {
        let line = "info depth 9 score cp 35 lowerbound nodes 1000";
        assert_eq!(Decoder.decode(line), UciOutput::Score(Score::Centipawns(35)));
    }

    #[test]
    fn test_score_anywhere_in_line() {
        // Not an info line, still carries an evaluation
        let line = "string eval score cp -12";
        assert_eq!(Decoder.decode(line), UciOutput::Score(Score::Centipawns(-12)));
    }

    #[test]
    fn test_score_malformed() {
        assert!(matches!(
            Decoder.decode("info score cp"),
            UciOutput::Other(_)
        ));
        assert!(matches!(
            Decoder.decode("info score wdl 10 20"),
            UciOutput::Other(_)
        ));
        assert!(matches!(
            Decoder.decode("info score cp abc"),
            UciOutput::Other(_)
        ));
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(Decoder.decode(""), UciOutput::Other(String::new()));
    }
}
