use anyhow::{Context, bail};

/// Name that means "look at nothing".
pub const NOTHING: &str = "none";

/// Hold the gaze on one panel (or on nothing) for a number of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazeSegment {
    pub target: Option<String>,
    pub frames: u32,
}

/// Parse `"red:120,none:10,blue:200"`.
pub fn parse(script: &str) -> anyhow::Result<Vec<GazeSegment>> {
    let mut segments = Vec::new();
    for part in script.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((name, frames)) = part.split_once(':') else {
            bail!("gaze segment '{part}' is not of the form name:frames");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("gaze segment '{part}' has no target name");
        }
        let frames: u32 = frames
            .trim()
            .parse()
            .with_context(|| format!("frame count in gaze segment '{part}'"))?;
        segments.push(GazeSegment {
            target: (name != NOTHING).then(|| name.to_string()),
            frames,
        });
    }
    if segments.is_empty() {
        bail!("gaze script is empty");
    }
    Ok(segments)
}

/// Gaze target for every frame, in order.
pub fn frames(segments: &[GazeSegment]) -> impl Iterator<Item = Option<&str>> {
    segments
        .iter()
        .flat_map(|s| std::iter::repeat_n(s.target.as_deref(), s.frames as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_targets_and_gaps() {
        let segs = parse("red:120, none:10 ,blue:200").unwrap();
        assert_eq!(
            segs,
            vec![
                GazeSegment { target: Some("red".into()), frames: 120 },
                GazeSegment { target: None, frames: 10 },
                GazeSegment { target: Some("blue".into()), frames: 200 },
            ]
        );
        assert_eq!(frames(&segs).count(), 330);
        assert_eq!(frames(&segs).nth(125), Some(None));
    }

    #[test]
    fn rejects_malformed_segments() {
        assert!(parse("").is_err());
        assert!(parse("red").is_err());
        assert!(parse(":10").is_err());
        assert!(parse("red:many").is_err());
        assert!(parse("red:-1").is_err());
    }
}
