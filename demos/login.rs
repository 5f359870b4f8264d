use std::{boxed, error};

fn main() {
    let url = match std::env::args().nth(1) {
        Some(x) => x,
        None => "https://registry-1.docker.io/v2/library/debian/tags/list".into(),
    };

    let user = std::env::var("REGISTRY_USER").ok();
    if user.is_none() {
        println!("no $REGISTRY_USER for login user");
    }
    let password = std::env::var("REGISTRY_PASSWORD").ok();
    if password.is_none() {
        println!("no $REGISTRY_PASSWORD for login password");
    }

    let res = run(&url, user, password);

    if let Err(e) = res {
        println!("[{}] {}", url, e);
        std::process::exit(1);
    };
}

fn run(
    url: &str,
    user: Option<String>,
    password: Option<String>,
) -> Result<(), boxed::Box<dyn error::Error>> {
    env_logger::Builder::new()
        .filter(Some("dktoken"), log::LevelFilter::Trace)
        .try_init()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let client = dktoken::v2::Client::configure()
        .username(user)
        .password(password)
        .build()?;

    let token = runtime.block_on(async {
        let challenge = client.fetch_challenge(url).await?;
        println!(
            "authorization server: {}, service: {}, scope: {}",
            challenge.realm(),
            challenge.service(),
            challenge.scope()
        );
        client.exchange_token(&challenge).await
    })?;

    println!("logged in, got a token of {} bytes", token.len());
    Ok(())
}
