use crate::browser::{Browser, ElementLocator};
use crate::config::ScrapeConfig;
use crate::crawl::wait::deadline_after;
use crate::error::{BrowserError, Result, ScrapeError};
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::Instant;

/// Delay between connection attempts while a launched driver boots
const DRIVER_READY_POLL: Duration = Duration::from_millis(200);

/// A live browser session: the WebDriver client plus the driver process
/// launched for it, if any.
///
/// Acquire with [`WebDriverSession::acquire`]; always finish with
/// [`WebDriverSession::release`]. The driver process is killed when the
/// session is dropped, so an unwinding crawl does not leak it.
pub struct WebDriverSession {
    client: Option<Client>,
    driver: Option<Child>,
}

impl WebDriverSession {
    /// Launch (or attach to) a WebDriver server and open a browser session.
    ///
    /// Fails with [`ScrapeError::Environment`] if the driver binary cannot be
    /// started or no session can be created.
    pub async fn acquire(config: &ScrapeConfig) -> Result<Self> {
        let mut driver = match &config.driver_path {
            Some(path) => Some(launch_driver(path, config.driver_port)?),
            None => None,
        };

        let webdriver_url = match driver {
            Some(_) => format!("http://localhost:{}", config.driver_port),
            None => config.webdriver_url.clone(),
        };

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities(config.headless));

        let deadline = deadline_after(config.driver_startup());
        let client = loop {
            match builder.connect(&webdriver_url).await {
                Ok(client) => break client,
                Err(e) => {
                    // Only a freshly launched driver gets time to come up
                    let Some(child) = driver.as_mut() else {
                        return Err(ScrapeError::Environment(format!(
                            "failed to connect to WebDriver at {}: {}",
                            webdriver_url, e
                        )));
                    };
                    if let Ok(Some(status)) = child.try_wait() {
                        return Err(ScrapeError::Environment(format!(
                            "driver exited during startup ({}): {}",
                            status, e
                        )));
                    }
                    if Instant::now() >= deadline {
                        return Err(ScrapeError::Environment(format!(
                            "driver at {} not ready after {:?}: {}",
                            webdriver_url,
                            config.driver_startup(),
                            e
                        )));
                    }
                    ::log::trace!("WebDriver not ready yet: {}", e);
                    tokio::time::sleep(DRIVER_READY_POLL).await;
                }
            }
        };

        ::log::info!(
            "Browser session acquired at {} (headless: {})",
            webdriver_url,
            config.headless
        );

        Ok(Self {
            client: Some(client),
            driver,
        })
    }

    /// Close the browser session and stop the driver process.
    ///
    /// Safe to call more than once; failures are logged, never returned.
    pub async fn release(&mut self) {
        if let Some(client) = self.client.take() {
            match client.close().await {
                Ok(()) => ::log::debug!("Browser session closed"),
                Err(e) => ::log::warn!("Failed to close browser session: {}", e),
            }
        }

        if let Some(mut child) = self.driver.take() {
            match child.kill().await {
                Ok(()) => ::log::debug!("Driver process stopped"),
                Err(e) => ::log::warn!("Failed to stop driver process: {}", e),
            }
        }
    }

    fn client(&self) -> Result<&Client, BrowserError> {
        self.client.as_ref().ok_or(BrowserError::Released)
    }
}

/// Spawn the driver binary on the given port
fn launch_driver(path: &Path, port: u16) -> Result<Child> {
    if !path.is_file() {
        return Err(ScrapeError::Environment(format!(
            "driver binary not found: {}",
            path.display()
        )));
    }

    ::log::info!("Launching driver {} on port {}", path.display(), port);
    Command::new(path)
        .arg(format!("--port={}", port))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            ScrapeError::Environment(format!(
                "failed to launch driver {}: {}",
                path.display(),
                e
            ))
        })
}

/// W3C capabilities for Chrome and Firefox drivers
fn capabilities(headless: bool) -> Map<String, Value> {
    let (chrome_args, firefox_args): (Vec<&str>, Vec<&str>) = if headless {
        (vec!["--headless", "--disable-gpu"], vec!["-headless"])
    } else {
        (Vec::new(), Vec::new())
    };

    let mut caps = Map::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
    caps.insert("moz:firefoxOptions".to_string(), json!({ "args": firefox_args }));
    caps
}

/// Owned form of a locator that fantoccini can borrow
enum Query {
    Css(String),
    XPath(String),
}

impl Query {
    fn new(locator: &ElementLocator) -> Self {
        match locator {
            ElementLocator::Css(selector) => Query::Css(selector.clone()),
            ElementLocator::Class(name) => Query::Css(format!(".{}", name)),
            ElementLocator::XPath(expr) => Query::XPath(expr.clone()),
        }
    }

    fn locator(&self) -> Locator<'_> {
        match self {
            Query::Css(selector) => Locator::Css(selector),
            Query::XPath(expr) => Locator::XPath(expr),
        }
    }
}

impl Browser for WebDriverSession {
    type Element = Element;

    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.client()?.goto(url).await?;
        Ok(())
    }

    async fn find_all(&mut self, locator: &ElementLocator) -> Result<Vec<Element>, BrowserError> {
        let query = Query::new(locator);
        Ok(self.client()?.find_all(query.locator()).await?)
    }

    async fn find_within(
        &mut self,
        parent: &Element,
        locator: &ElementLocator,
    ) -> Result<Option<Element>, BrowserError> {
        let query = Query::new(locator);
        match parent.find(query.locator()).await {
            Ok(element) => Ok(Some(element)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) if e.is_stale_element_reference() => Err(BrowserError::Detached(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn text(&mut self, element: &Element) -> Result<String, BrowserError> {
        Ok(element.text().await?)
    }

    async fn click(&mut self, element: &Element) -> Result<(), BrowserError> {
        element.click().await?;
        Ok(())
    }
}
