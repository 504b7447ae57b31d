use anyhow::Context;
use clap::Parser;
use generator::profile::build_shot_footage;
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::VisualizationModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Launch monitor workflow driver")]
struct Args {
    /// Run one synthetic shot offline and emit a baseline summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Brightness threshold applied to both cameras
    #[arg(long, default_value_t = 200)]
    threshold: u8,
    #[arg(long, default_value_t = 8)]
    burst_len: usize,
    #[arg(long, default_value_t = 5.0)]
    camera_gap_in: f32,
    /// Keep the GUI bridge alive for incoming footage
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.threshold, args.burst_len, args.camera_gap_in)
    };

    let runner = Runner::new(workflow_config);
    let gui_bridge = GuiBridge::new(Arc::new(runner.clone()));
    let footage = build_shot_footage(640, 480)?;

    if args.offline {
        let result = runner.execute(&footage)?;

        match result.shot {
            Some(shot) => println!(
                "Offline run -> {:.1} mph, {:.1} deg, {:.1} ft (valid {})",
                shot.speed_mph, shot.launch_angle_deg, shot.carry_ft, shot.valid
            ),
            None => println!("Offline run -> no burst sealed"),
        }
        println!(
            "frames {} detections top {} bottom {} final state {:?}",
            result.frames_processed,
            result.top_detections,
            result.bottom_detections,
            result.final_state
        );

        let model = VisualizationModel::from_result(&result);
        gui_bridge.publish(&model)?;
        gui_bridge.publish_status("Offline shot results ready.");

        let report = format!(
            "shot_sealed={} frames={} top={} bottom={} notes={:?}\n",
            result.shot.is_some(),
            result.frames_processed,
            result.top_detections,
            result.bottom_detections,
            result.notes
        );
        let report_path = PathBuf::from("tools/data/offline_shots.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
