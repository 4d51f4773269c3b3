#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum)]
    pub cargo_env: CargoEnv,

    // port that the app will bind to
    #[clap(long, env, default_value = "5000")]
    pub port: u16,

    // this should be either * for allowing everything, or a comma seperated list of domains like
    // example.com,something.com
    //
    // only the json api uses this, the embed route is always served to any origin when
    // open_embed_headers is on
    #[clap(long, env, default_value = "*")]
    pub cors_origin: String,

    // same as above but used for preview environments to stress or test the api.
    #[clap(long, env, default_value = "*")]
    pub preview_cors_origin: String,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,

    // hard limit for a single upstream player fetch
    #[clap(long, env, default_value = "15")]
    pub upstream_timeout_secs: u64,

    // a lot of embed hosts run expired or self signed certs, turning this off will make some
    // providers stop loading entirely
    #[clap(long, env, default_value = "true", action = clap::ArgAction::Set)]
    pub accept_invalid_certs: bool,

    // Access-Control-Allow-Origin: * and unrestricted framing on the embed route
    #[clap(long, env, default_value = "true", action = clap::ArgAction::Set)]
    pub open_embed_headers: bool,

    // appended after the built in ad signatures, e.g. AD_SIGNATURES=hilltopads,clickadu
    #[clap(long = "ad-signatures", env = "AD_SIGNATURES", value_delimiter = ',')]
    pub extra_ad_signatures: Vec<String>,

    // metadata provider, the proxy works without it
    #[clap(long, env)]
    pub tmdb_api_key: Option<String>,

    #[clap(long, env, default_value = "https://api.themoviedb.org/3")]
    pub tmdb_base_url: String,

    // requests per second across the whole router
    #[clap(long, env, default_value = "50")]
    pub rate_limit_per_second: u64,
}

impl Default for AppConfig {
    // defaults aren't really needed here but it's here as a bad fallback (and for tests)
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            port: 5000,
            cors_origin: "*".to_string(),
            preview_cors_origin: "*".to_string(),
            sentry_dsn: None,
            upstream_timeout_secs: 15,
            accept_invalid_certs: true,
            open_embed_headers: true,
            extra_ad_signatures: Vec::new(),
            tmdb_api_key: None,
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            rate_limit_per_second: 50,
        }
    }
}
