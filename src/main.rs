use std::path::{Path, PathBuf};

use eyre::WrapErr;
use serde::Serialize;
use sitelang::{
    presenter::{ApplyReport, RewriteReport},
    Config, FileStore, LocalePresenter, LocaleSource, StaticPage,
};
use url::Url;

const USAGE: &str = "\
usage: sitelang [--config FILE] [--store FILE] [--toggle | --set CODE] PAGE URL

  PAGE            HTML file to present
  URL             address the page is loaded from, e.g. https://lovegrover.com/contact?lang=hi

  --config FILE   TOML configuration (defaults apply without one)
  --store FILE    preference file for this origin [default: preferences.toml]
  --toggle        switch to the other language after loading
  --set CODE      switch to CODE after loading, unsupported codes are ignored
";

enum Action {
    Load,
    Toggle,
    Set(String),
}

struct Args {
    config: Option<PathBuf>,
    store: PathBuf,
    action: Action,
    page: PathBuf,
    url: Url,
}

#[derive(Serialize)]
struct Report<'a> {
    locale: &'static str,
    source: LocaleSource,
    address: &'a str,
    applied: ApplyReport,
    links: RewriteReport,
    page: &'a StaticPage,
}

fn main() -> eyre::Result<()> {
    let Some(args) = parse_args(pico_args::Arguments::from_env())? else {
        print!("{USAGE}");
        return Ok(());
    };
    let config = load_config(args.config.as_deref())?;

    let logger = setup_logger(&config.log_level)?;
    let _log_guard = slog_scope::set_global_logger(logger.clone());
    slog_stdlog::init_with_level(log::Level::Info)?;
    slog::info!(logger, "boot"; "page" => %args.page.display(), "url" => %args.url);

    let markup = std::fs::read_to_string(&args.page)
        .wrap_err_with(|| format!("reading {}", args.page.display()))?;
    let mut page = StaticPage::from_html(&markup)?;

    let store = FileStore::new(args.store);
    let mut presenter = LocalePresenter::new(&config, args.url, store, &logger);
    let loaded = presenter.load(&mut page);

    // the report describes the last pass that touched the page
    let (applied, links) = match args.action {
        Action::Load => loaded,
        Action::Toggle => presenter.toggle(&mut page),
        Action::Set(code) => match presenter.set(&mut page, &code) {
            Some(switched) => switched,
            None => {
                slog::warn!(logger, "set.unsupported_locale"; "value" => code);
                loaded
            }
        },
    };

    let report = Report {
        locale: presenter.locale().code(),
        source: presenter.source(),
        address: presenter.location().as_str(),
        applied,
        links,
        page: &page,
    };
    print!("{}", toml::to_string(&report)?);

    Ok(())
}

fn parse_args(mut pargs: pico_args::Arguments) -> eyre::Result<Option<Args>> {
    if pargs.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let config = pargs.opt_value_from_str("--config")?;
    let store = pargs
        .opt_value_from_str("--store")?
        .unwrap_or_else(|| PathBuf::from("preferences.toml"));
    let toggle = pargs.contains("--toggle");
    let set: Option<String> = pargs.opt_value_from_str("--set")?;

    let action = match (toggle, set) {
        (true, Some(_)) => eyre::bail!("--toggle and --set are mutually exclusive"),
        (true, None) => Action::Toggle,
        (false, Some(code)) => Action::Set(code),
        (false, None) => Action::Load,
    };

    let page = pargs.free_from_str()?;
    let url = pargs.free_from_str()?;

    let rest = pargs.finish();
    if !rest.is_empty() {
        eyre::bail!("unexpected arguments: {rest:?}");
    }

    Ok(Some(Args {
        config,
        store,
        action,
        page,
        url,
    }))
}

fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    Config::load(path).wrap_err_with(|| format!("loading {}", path.display()))
}

/// Terminal logger on stderr, stdout carries the report.
fn setup_logger(level: &str) -> eyre::Result<slog::Logger> {
    use sloggers::terminal::{Destination, TerminalLoggerBuilder};
    use sloggers::types::{Format, Severity};
    use sloggers::Build;

    let severity: Severity = level
        .parse()
        .map_err(|_| eyre::eyre!("unknown log level `{level}`"))?;

    let mut builder = TerminalLoggerBuilder::new();
    builder.level(severity);
    builder.format(Format::Full);
    builder.destination(Destination::Stderr);

    builder
        .build()
        .map_err(|err| eyre::eyre!("logger setup failed: {err}"))
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    fn args(raw: &[&str]) -> pico_args::Arguments {
        pico_args::Arguments::from_vec(raw.iter().map(|arg| OsString::from(*arg)).collect())
    }

    #[test]
    fn parses_toggle_with_defaults() {
        let parsed = parse_args(args(&["--toggle", "index.html", "https://lovegrover.com/"]))
            .unwrap()
            .unwrap();

        assert!(matches!(parsed.action, Action::Toggle));
        assert_eq!(parsed.store, PathBuf::from("preferences.toml"));
        assert!(parsed.config.is_none());
        assert_eq!(parsed.page, PathBuf::from("index.html"));
        assert_eq!(parsed.url.as_str(), "https://lovegrover.com/");
    }

    #[test]
    fn parses_set_and_paths() {
        let parsed = parse_args(args(&[
            "--config",
            "site.toml",
            "--store",
            "origin.toml",
            "--set",
            "hi",
            "contact.html",
            "https://lovegrover.com/contact.html",
        ]))
        .unwrap()
        .unwrap();

        assert!(matches!(parsed.action, Action::Set(ref code) if code == "hi"));
        assert_eq!(parsed.config, Some(PathBuf::from("site.toml")));
        assert_eq!(parsed.store, PathBuf::from("origin.toml"));
    }

    #[test]
    fn toggle_and_set_are_exclusive() {
        let result = parse_args(args(&[
            "--toggle",
            "--set",
            "hi",
            "index.html",
            "https://lovegrover.com/",
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bad_url_and_extra_arguments() {
        assert!(parse_args(args(&["index.html", "not a url"])).is_err());
        assert!(parse_args(args(&["index.html"])).is_err());
        assert!(parse_args(args(&["index.html", "https://lovegrover.com/", "extra"])).is_err());
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn load_config_defaults_and_errors() {
        assert_eq!(load_config(None).unwrap(), Config::default());

        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());

        let path = dir.path().join("site.toml");
        std::fs::write(&path, "query_param = \"hl\"\n").unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().query_param, "hl");
    }
}
