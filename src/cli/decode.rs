// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::fs;
use std::process;

use serde::{Deserialize, Serialize};

use paf_decoder::{DecodeError, DecodeSpeed, DecoderConfig, PoseDecoder, Poses, Topology, VERSION};

use crate::cli::args::{DecodeArgs, TopologyArgs};
use crate::cli::logging::{Verbosity, set_verbosity};
use crate::{error, info, section, success, verbose, warn};

/// One tensor of a frame dump: row-major data plus its shape.
#[derive(Debug, Deserialize)]
struct TensorDump {
    shape: Vec<usize>,
    data: Vec<f32>,
}

/// Model outputs captured for a single frame.
#[derive(Debug, Deserialize)]
struct FrameDump {
    cmap: TensorDump,
    paf: TensorDump,
}

#[derive(Debug, Serialize)]
struct KeypointReport<'a> {
    part: &'a str,
    candidate: usize,
    x: f32,
    y: f32,
}

#[derive(Debug, Serialize)]
struct PersonReport<'a> {
    keypoints: Vec<KeypointReport<'a>>,
}

#[derive(Debug, Serialize)]
struct DecodeReport<'a> {
    frame: &'a str,
    /// `true` when coordinates are normalized, `false` when in pixels.
    normalized: bool,
    counts: Vec<usize>,
    people: Vec<PersonReport<'a>>,
    speed: &'a DecodeSpeed,
}

/// Run the `decode` command.
pub fn run_decode(args: &DecodeArgs) {
    set_verbosity(if args.json {
        Verbosity::Quiet
    } else if args.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    let topology = load_topology(args.topology.as_deref());
    let config = DecoderConfig::new()
        .with_confidence(args.conf)
        .with_window_size(args.window)
        .with_max_parts(args.max_parts)
        .with_num_samples(args.samples)
        .with_link_threshold(args.link)
        .with_max_objects(args.max_objects);

    verbose!("paf-decoder {VERSION}");
    verbose!(
        "Topology: {} parts, {} limbs",
        topology.num_parts(),
        topology.num_limbs()
    );

    let poses = match decode_frame(&args.frame, config, topology.clone()) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to decode {}: {e}", args.frame);
            process::exit(1);
        }
    };

    let scale = args.width.zip(args.height);
    let report = build_report(&args.frame, &poses, &topology, scale);

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Failed to serialize results: {e}");
                process::exit(1);
            }
        }
        return;
    }

    print_report(&report, &poses);
}

/// Run the `topology` command.
pub fn run_topology(args: &TopologyArgs) {
    let topology = load_topology(args.topology.as_deref());
    section!(
        "Topology: {} parts, {} limbs, {} field channels",
        topology.num_parts(),
        topology.num_limbs(),
        topology.num_field_channels()
    );
    for (i, limb) in topology.limbs().iter().enumerate() {
        info!(
            "{i:>3}  {:<16} -> {:<16} field ({}, {})",
            topology.part_name(limb.part_a).unwrap_or("?"),
            topology.part_name(limb.part_b).unwrap_or("?"),
            limb.paf_x,
            limb.paf_y
        );
    }
}

fn load_topology(path: Option<&str>) -> Topology {
    let Some(path) = path else {
        return Topology::human_pose();
    };
    match Topology::from_json_file(path) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to load topology: {e}");
            process::exit(1);
        }
    }
}

fn decode_frame(path: &str, config: DecoderConfig, topology: Topology) -> Result<Poses, DecodeError> {
    let json = fs::read_to_string(path)
        .map_err(|e| DecodeError::IoError(format!("failed to read frame {path}: {e}")))?;
    let frame: FrameDump = serde_json::from_str(&json)?;

    let (cmap_channels, _, _) = paf_decoder::tensor_dims(&frame.cmap.shape)?;
    let (paf_channels, _, _) = paf_decoder::tensor_dims(&frame.paf.shape)?;
    let decoder = PoseDecoder::new(config, topology, cmap_channels, paf_channels)?;

    decoder.decode_raw(
        &frame.cmap.data,
        &frame.cmap.shape,
        &frame.paf.data,
        &frame.paf.shape,
    )
}

#[allow(clippy::cast_precision_loss)]
fn build_report<'a>(
    frame: &'a str,
    poses: &'a Poses,
    topology: &'a Topology,
    scale: Option<(u32, u32)>,
) -> DecodeReport<'a> {
    let (sx, sy) = scale.map_or((1.0, 1.0), |(w, h)| (w as f32, h as f32));
    let people = poses
        .skeletons
        .iter()
        .enumerate()
        .map(|(n, slots)| PersonReport {
            keypoints: slots
                .iter()
                .enumerate()
                .filter_map(|(part, slot)| {
                    let candidate = (*slot)?;
                    let [y, x] = poses.keypoint(n, part)?;
                    Some(KeypointReport {
                        part: topology.part_name(part).unwrap_or("?"),
                        candidate,
                        x: x * sx,
                        y: y * sy,
                    })
                })
                .collect(),
        })
        .collect();

    DecodeReport {
        frame,
        normalized: scale.is_none(),
        counts: poses.counts(),
        people,
        speed: &poses.speed,
    }
}

fn print_report(report: &DecodeReport<'_>, poses: &Poses) {
    let total: usize = report.counts.iter().sum();
    verbose!("Candidates per part: {:?} ({total} total)", report.counts);

    if report.people.is_empty() {
        warn!("No skeletons found in {}", report.frame);
    }

    for (n, person) in report.people.iter().enumerate() {
        section!("Person {n} ({} keypoints)", person.keypoints.len());
        for kp in &person.keypoints {
            if report.normalized {
                info!("  {:<16} ({:.4}, {:.4})", kp.part, kp.x, kp.y);
            } else {
                info!("  {:<16} ({:.1}, {:.1})", kp.part, kp.x, kp.y);
            }
        }
    }

    let speed = &poses.speed;
    verbose!(
        "Speed: {:.2}ms peaks, {:.2}ms refine, {:.2}ms score, {:.2}ms assign, {:.2}ms connect",
        speed.find_peaks,
        speed.refine,
        speed.score,
        speed.assign,
        speed.connect
    );
    success!(
        "Decoded {} skeleton(s) in {:.2}ms",
        poses.len(),
        speed.total()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_report_scales_to_pixels() {
        let topology =
            Topology::from_pairs(vec!["a".to_string(), "b".to_string()], &[[0, 1]]).unwrap();
        let poses = Poses::new(
            vec![vec![Some(0), None]],
            vec![vec![[0.5, 0.25]], vec![]],
            DecodeSpeed::default(),
        );
        let report = build_report("f.json", &poses, &topology, Some((200, 100)));
        assert!(!report.normalized);
        assert_eq!(report.people.len(), 1);
        let kp = &report.people[0].keypoints[0];
        assert_eq!(kp.part, "a");
        assert!((kp.x - 50.0).abs() < 1e-4);
        assert!((kp.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_frame_dump_parses() {
        let json = r#"{"cmap": {"shape": [1, 2, 2, 2], "data": [0,0,0,0,0,0,0,0]},
                       "paf": {"shape": [2, 2, 2], "data": [0,0,0,0,0,0,0,0]}}"#;
        let frame: FrameDump = serde_json::from_str(json).unwrap();
        assert_eq!(frame.cmap.shape, vec![1, 2, 2, 2]);
        assert_eq!(frame.paf.data.len(), 8);
    }
}
