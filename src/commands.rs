use anyhow::Result;

use crate::cli::{Cli, SearchArgs};
use crate::config::DashboardConfig;
use crate::error::ZonescopeError;
use crate::io::load_layer;
use crate::layer::LayerKind;
use crate::session::{Event, PanelId, Session};

pub fn search(cli: &Cli, args: &SearchArgs) -> Result<()> {
    let config = DashboardConfig::from_file(&args.config)?;
    let frame = config.display_frame;

    let coarse = load_layer(&config.coarse, &[], frame)?;
    let fine = load_layer(&config.fine, &config.attributes, frame)?;
    let micro = load_layer(&config.micro, &config.attributes, frame)?;

    if cli.verbose > 0 {
        eprintln!(
            "[search] loaded coarse={} fine={} micro={}",
            coarse.len(),
            fine.len(),
            micro.len()
        );
    }

    let mut session = Session::new(config.cascade_config(), frame, coarse, fine, micro);
    let outcome = session.handle(Event::SearchRequested {
        query: args.id.clone(),
        extra: args.extra.clone(),
    });
    match outcome {
        Ok(()) => {}
        // User errors, not crashes: report and exit cleanly.
        Err(err @ (ZonescopeError::InvalidInput(_) | ZonescopeError::NotFound(_))) => {
            println!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }

    if !args.select.is_empty() {
        session.handle(Event::SelectionChanged {
            layer: LayerKind::Fine,
            indices: args.select.clone(),
        })?;
    }

    let store = session.store();
    println!(
        "zone {}: {} fine sub-polygons, {} micro sub-polygons",
        args.id,
        store.fine.view.len(),
        store.micro.view.len()
    );
    let viewport = session.viewports().bounds(PanelId::Primary);
    println!(
        "viewport: [{:.1}, {:.1}, {:.1}, {:.1}]",
        viewport.min().x,
        viewport.min().y,
        viewport.max().x,
        viewport.max().y
    );

    println!("fine table ({}):", config.attributes.join(", "));
    println!("{}", serde_json::to_string_pretty(session.fine_table())?);
    println!("micro table ({}):", config.attributes.join(", "));
    println!("{}", serde_json::to_string_pretty(session.micro_table())?);

    Ok(())
}
