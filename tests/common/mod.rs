#![allow(dead_code)]

use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use extension_packager::filters::add_checksum;
use extension_packager::{BuildError, FiltersConfig, LocalesConfig, Result, Transport};
use tempfile::TempDir;

/// Env guard that restores previous env vars on drop.
pub struct EnvGuard {
    old: HashMap<String, Option<String>>,
}

impl EnvGuard {
    pub fn set(vars: &[(&str, String)]) -> Self {
        let mut old = HashMap::new();
        for (k, v) in vars {
            old.insert((*k).to_string(), env::var(k).ok());
            env::set_var(k, v);
        }
        Self { old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, prev) in self.old.drain() {
            match prev {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }
    }
}

pub fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap_or_else(|e| panic!("read {rel}: {e}"))
}

pub const CHROME_MANIFEST: &str = r#"{
  "name": "__MSG_name__",
  "version": "${version}",
  "key": "${extensionId}"
}
"#;

pub const SAFARI_PLIST: &str = "<key>CFBundleIdentifier</key><string>${extensionId}</string>\n\
<key>CFBundleVersion</key><string>${version}</string>\n\
<key>Update Manifest URL</key><string>${updateURL}</string>\n\
<key>UpdateFromGallery</key><${updateFromGallery}/>\n\
<key>CFBundleDisplayName</key><string>Blocker${extensionNamePostfix}</string>\n";

pub const INSTALL_RDF: &str = "<em:id>${extensionId}</em:id>\n\
<em:version>${version}</em:version>\n\
<em:name>Blocker${extensionNamePostfix}</em:name>${updateUrl}\n\
${localised}";

pub const PACKAGE_JSON: &str = r#"{"id": "${extensionId}", "version": "${version}", "title": "Blocker${extensionNamePostfix}"}"#;

pub const WEBEXT_MANIFEST: &str = r#"{"version": "${version}", "applications": {"gecko": {"id": "${extensionId}"}}}"#;

pub const OPTIONS_HTML: &str = "<title>{{ browser }}</title>\n\
{% if browser == \"safari\" %}<p>safari only</p>{% endif %}\n";

/// A complete canonical source tree covering every browser.
pub fn source_tree() -> TempDir {
    let td = TempDir::new().expect("tempdir");
    let root = td.path();

    write(root, "browser/webkit/a.txt", "base");
    write(root, "browser/webkit/only-webkit.txt", "webkit");
    write(root, "browser/webkit/.DS_Store", "junk");
    write(root, "browser/webkit/icons/icon16.png", "png");
    write(root, "browser/chrome/a.txt", "chrome");
    write(root, "browser/chrome/manifest.json", CHROME_MANIFEST);
    write(root, "browser/chrome/devtools/devtools.html", "<p>devtools</p>");
    write(root, "browser/edge/a.txt", "edge");
    write(root, "browser/safari/a.txt", "safari");
    write(root, "browser/safari/Info.plist", SAFARI_PLIST);
    write(root, "browser/firefox/install.rdf", INSTALL_RDF);
    write(root, "browser/firefox/package.json", PACKAGE_JSON);
    write(root, "browser/firefox_webext/manifest.json", WEBEXT_MANIFEST);
    write(root, "browser/firefox_webext/install.rdf", INSTALL_RDF);
    write(root, "browser/firefox_webext/package.json", PACKAGE_JSON);
    write(root, "browser/firefox_webext/pages/webext.html", "<b>{{ browser }}</b>");
    write(root, "api/api.js", "export const api = {};");

    for group in ["chromium", "safari", "firefox"] {
        write(
            root,
            &format!("filters/{group}/filter_1.txt"),
            &format!("! {group}\nexample.com#%#run()\n"),
        );
    }
    write(root, "filters/.git/HEAD", "ref: main");

    write(
        root,
        "_locales/en/messages.json",
        r#"{
  "name": {"message": "Blocker", "description": "Extension name"},
  "short_name": {"message": "Blk"},
  "description": {"message": "Blocks ads & trackers"},
  "greeting": {"message": "Hello\nthere"}
}"#,
    );
    write(
        root,
        "_locales/de/messages.json",
        r#"{"name": {"message": "Blocker DE"}, "greeting": {"message": "Hallo"}}"#,
    );
    write(
        root,
        "_locales/pt_BR/messages.json",
        r#"{"greeting": {"message": "Olá"}}"#,
    );
    write(
        root,
        "_locales/xx_YY/messages.json",
        r#"{"greeting": {"message": "??"}}"#,
    );

    write(root, "pages/options.html", OPTIONS_HTML);
    write(root, "pages/.draft.html", "{{ broken");
    write(root, "pages/skin/fonts.css", "default fonts");
    write(root, "pages/skin/firefox-fonts.css", "firefox fonts");
    write(root, "pages/skin/fonts/roboto.woff", "woff");
    write(root, "lib/common.js", "var common = 1;");

    td
}

pub fn locales_config() -> LocalesConfig {
    LocalesConfig {
        base_locale: "en".into(),
        supported: vec!["en".into(), "de".into(), "pt_BR".into()],
    }
}

pub fn filters_config(max_filter_id: u32, retired: &[u32]) -> FiltersConfig {
    FiltersConfig {
        server_url: "https://filters.test".into(),
        user_agent: "tests".into(),
        max_filter_id,
        retired_filter_ids: retired.to_vec(),
        timeout_secs: 5,
        english_filter_id: 2,
        safari_user_agent: "safari-tests".into(),
    }
}

/// In-memory filter server keyed by full URL, and by User-Agent for
/// documents registered with [`FakeServer::insert_for_agent`].
#[derive(Default)]
pub struct FakeServer {
    docs: HashMap<String, String>,
    agent_docs: HashMap<(String, String), String>,
    pub requests: Mutex<Vec<String>>,
    /// `(url, user_agent)` of every request made with an explicit agent.
    pub agent_requests: Mutex<Vec<(String, String)>>,
}

impl FakeServer {
    pub fn insert(&mut self, url: impl Into<String>, body: impl Into<String>) {
        self.docs.insert(url.into(), body.into());
    }

    pub fn insert_for_agent(
        &mut self,
        user_agent: impl Into<String>,
        url: impl Into<String>,
        body: impl Into<String>,
    ) {
        self.agent_docs
            .insert((url.into(), user_agent.into()), body.into());
    }

    /// Serves checksummed filters for every configured id of `group`,
    /// plus both metadata documents.
    pub fn with_group(config: &FiltersConfig, group: extension_packager::BrowserGroup) -> Self {
        let mut server = FakeServer::default();
        server.insert(config.metadata_url(group), r#"{"filters": []}"#);
        server.insert(config.i18n_metadata_url(group), r#"{"groups": {}}"#);
        for id in config.filter_ids() {
            server.insert(
                config.filter_url(group, id),
                add_checksum(&format!(
                    "! Title: Filter {id}\n||ads{id}.example^\nexample.com#%#window.f{id}()\n#%#shared()\n"
                )),
            );
            server.insert(
                config.optimized_filter_url(group, id),
                add_checksum(&format!("! Title: Filter {id} (optimized)\n||ads{id}.example^\n")),
            );
        }
        server
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for FakeServer {
    fn get_text(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.docs.get(url).cloned().ok_or_else(|| BuildError::Transport {
            url: url.to_string(),
            message: "404 Not Found".into(),
        })
    }

    fn get_text_as(&self, url: &str, user_agent: &str) -> Result<String> {
        self.agent_requests
            .lock()
            .unwrap()
            .push((url.to_string(), user_agent.to_string()));
        match self.agent_docs.get(&(url.to_string(), user_agent.to_string())) {
            Some(body) => {
                self.requests.lock().unwrap().push(url.to_string());
                Ok(body.clone())
            }
            None => self.get_text(url),
        }
    }
}

/// Visible entries of `dir`, excluding hidden ones.
pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn dest_in(td: &TempDir, name: &str) -> PathBuf {
    td.path().join(name)
}
