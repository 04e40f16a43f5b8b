// Logging setup for the binary

/// Initialise the global logger
///
/// INFO by default; `RUST_LOG` overrides it and an explicit `level` overrides
/// both.
pub fn init_logger(level: Option<log::LevelFilter>) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    builder.parse_default_env();
    if let Some(level) = level {
        builder.filter_level(level);
    }

    builder
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {:5} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .init();
}
