// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Decode Options:
    --frame, -f <FRAME>        Frame dump with "cmap" and "paf" tensors (JSON)
    --topology, -t <TOPOLOGY>  Topology asset (trt_pose JSON) [default: built-in human pose]
    --conf <CONF>              Heatmap confidence threshold [default: 0.1]
    --window <WINDOW>          Local-maximum window size [default: 5]
    --max-parts <N>            Candidates kept per part type [default: 2]
    --samples <N>              Field samples per candidate pair [default: 7]
    --link <LINK>              Link-acceptance threshold [default: 0.1]
    --max-objects <N>          Skeletons kept per frame [default: 100]
    --width, --height <PX>     Report keypoints in pixels for this render size
    --json                     Print the decoded poses as JSON
    --verbose                  Show verbose output

Examples:
    paf-decoder decode --frame frame.json
    paf-decoder decode -f frame.json -t human_pose.json --conf 0.15 --link 0.2
    paf-decoder decode -f frame.json --width 1920 --height 1080 --json
    paf-decoder topology -t human_pose.json"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode one dumped frame of heatmap and affinity-field tensors
    Decode(DecodeArgs),
    /// Print the limb table of a topology
    Topology(TopologyArgs),
}

/// Arguments for the decode command.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame dump with "cmap" and "paf" tensors (JSON)
    #[arg(short, long)]
    pub frame: String,

    /// Topology asset (trt_pose JSON); the built-in human pose table if omitted
    #[arg(short, long)]
    pub topology: Option<String>,

    /// Heatmap confidence threshold
    #[arg(long, default_value_t = 0.1)]
    pub conf: f32,

    /// Local-maximum window size
    #[arg(long, default_value_t = 5)]
    pub window: usize,

    /// Candidates kept per part type
    #[arg(long, default_value_t = 2)]
    pub max_parts: usize,

    /// Field samples per candidate pair
    #[arg(long, default_value_t = 7)]
    pub samples: usize,

    /// Link-acceptance threshold
    #[arg(long, default_value_t = 0.1)]
    pub link: f32,

    /// Skeletons kept per frame
    #[arg(long, default_value_t = 100)]
    pub max_objects: usize,

    /// Render width for pixel coordinates
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Render height for pixel coordinates
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Print the decoded poses as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the topology command.
#[derive(Args, Debug)]
pub struct TopologyArgs {
    /// Topology asset (trt_pose JSON); the built-in human pose table if omitted
    #[arg(short, long)]
    pub topology: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_decode_args_defaults() {
        let args = Cli::parse_from(["app", "decode", "--frame", "frame.json"]);
        match args.command {
            Commands::Decode(decode_args) => {
                assert_eq!(decode_args.frame, "frame.json");
                assert!(decode_args.topology.is_none());
                assert!((decode_args.conf - 0.1).abs() < f32::EPSILON);
                assert!((decode_args.link - 0.1).abs() < f32::EPSILON);
                assert_eq!(decode_args.window, 5);
                assert_eq!(decode_args.max_parts, 2);
                assert_eq!(decode_args.samples, 7);
                assert_eq!(decode_args.max_objects, 100);
                assert!(decode_args.width.is_none());
                assert!(!decode_args.json);
                assert!(decode_args.verbose);
            }
            Commands::Topology(_) => panic!("expected decode"),
        }
    }

    #[test]
    fn test_decode_args_custom() {
        let args = Cli::parse_from([
            "app",
            "decode",
            "-f",
            "frame.json",
            "-t",
            "human_pose.json",
            "--conf",
            "0.3",
            "--width",
            "1920",
            "--height",
            "1080",
            "--json",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Decode(decode_args) => {
                assert_eq!(decode_args.topology, Some("human_pose.json".to_string()));
                assert!((decode_args.conf - 0.3).abs() < f32::EPSILON);
                assert_eq!(decode_args.width, Some(1920));
                assert_eq!(decode_args.height, Some(1080));
                assert!(decode_args.json);
                assert!(!decode_args.verbose);
            }
            Commands::Topology(_) => panic!("expected decode"),
        }
    }

    #[test]
    fn test_width_requires_height() {
        let result = Cli::try_parse_from(["app", "decode", "-f", "frame.json", "--width", "640"]);
        assert!(result.is_err());
    }
}
