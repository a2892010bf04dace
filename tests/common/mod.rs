#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use brick_purge::core::errors::Result;
use brick_purge::purge::brick::{BrickFs, ChildEntry, EntryKind, LocalBrick};
use brick_purge::purge::gfid::Gfid;

/// What the fixture brick was asked to mutate, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    RemoveFile(PathBuf),
    RemoveDir(PathBuf),
}

impl Mutation {
    pub fn path(&self) -> &Path {
        match self {
            Self::RemoveFile(p) | Self::RemoveDir(p) => p,
        }
    }
}

/// A real directory tree whose GFIDs live in a map instead of `trusted.gfid`.
#[derive(Default)]
pub struct FixtureBrick {
    pub gfids: HashMap<PathBuf, Gfid>,
    pub mutations: RefCell<Vec<Mutation>>,
}

impl BrickFs for FixtureBrick {
    fn probe(&self, path: &Path) -> Result<Option<EntryKind>> {
        LocalBrick.probe(path)
    }

    fn list_children(&self, dir: &Path) -> Result<Vec<ChildEntry>> {
        LocalBrick.list_children(dir)
    }

    fn read_xattr(&self, path: &Path, _name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.gfids.get(path).map(|g| g.as_bytes().to_vec()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.mutations
            .borrow_mut()
            .push(Mutation::RemoveFile(path.to_path_buf()));
        LocalBrick.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.mutations
            .borrow_mut()
            .push(Mutation::RemoveDir(path.to_path_buf()));
        LocalBrick.remove_dir(path)
    }
}

/// Builds a brick layout: entries plus their `.glusterfs` links.
pub struct BrickBuilder {
    pub tmp: tempfile::TempDir,
    pub root: PathBuf,
    pub brick: FixtureBrick,
    counter: u8,
}

impl BrickBuilder {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp brick");
        let root = tmp.path().join("brick1");
        fs::create_dir_all(root.join(".glusterfs")).expect("create link store");
        Self {
            tmp,
            root,
            brick: FixtureBrick::default(),
            counter: 0,
        }
    }

    pub fn next_gfid(&mut self) -> Gfid {
        self.counter += 1;
        let mut bytes = [0x5c_u8; 16];
        bytes[0] = self.counter;
        bytes[1] = self.counter.wrapping_mul(7);
        bytes[15] = self.counter;
        Gfid::from_bytes(bytes)
    }

    pub fn link_for(&self, gfid: &Gfid) -> PathBuf {
        gfid.link_path(&self.root, ".glusterfs")
    }

    /// Regular file with a GFID and a `.glusterfs` hardlink. Returns (path, link).
    pub fn file(&mut self, rel: &str) -> (PathBuf, PathBuf) {
        let path = self.root.join(rel);
        fs::write(&path, format!("contents of {rel}")).expect("write file");
        let gfid = self.next_gfid();
        let link = self.link_for(&gfid);
        fs::create_dir_all(link.parent().expect("link parent")).expect("create shard dirs");
        fs::hard_link(&path, &link).expect("create gfid hardlink");
        self.brick.gfids.insert(path.clone(), gfid);
        (path, link)
    }

    /// Directory with a GFID and a `.glusterfs` symlink. Returns (path, link).
    pub fn dir(&mut self, rel: &str) -> (PathBuf, PathBuf) {
        let path = self.root.join(rel);
        fs::create_dir(&path).expect("create dir");
        let gfid = self.next_gfid();
        let link = self.link_for(&gfid);
        fs::create_dir_all(link.parent().expect("link parent")).expect("create shard dirs");
        let name = Path::new(rel).file_name().expect("dir name");
        symlink(
            Path::new("../../00/00/00000000-0000-0000-0000-000000000001").join(name),
            &link,
        )
        .expect("create gfid symlink");
        self.brick.gfids.insert(path.clone(), gfid);
        (path, link)
    }

    /// Every path under the brick root, `.glusterfs` included, sorted.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        snapshot_tree(&self.root)
    }
}

pub fn snapshot_tree(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).expect("read dir").flatten() {
            let path = entry.path();
            if entry.file_type().expect("file type").is_dir() {
                stack.push(path.clone());
            }
            out.push(path);
        }
    }
    out.sort();
    out
}

pub fn lexists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

// ──────────────────── CLI harness ────────────────────

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Some(path) = option_env!("CARGO_BIN_EXE_brick-purge") {
        return PathBuf::from(path);
    }

    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join("brick-purge"));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve brick-purge binary path for integration test"),
    }
}

pub fn run_cli_case(case_name: &str, args: &[&str], env: &[(&str, &str)]) -> CmdResult {
    let root = std::env::temp_dir().join("brick-purge-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("RUST_BACKTRACE", "1")
        .stdin(Stdio::null());
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command.output().expect("execute brick-purge command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
