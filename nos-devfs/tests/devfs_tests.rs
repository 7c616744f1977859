//! DevFS tree and dispatcher tests

use nos_devfs::devices::STDIO_LINKS;
use nos_devfs::types::makedev;
use nos_devfs::*;

fn config() -> DevFsConfig {
    DevFsConfig::default().with_seed(0x6465_7666)
}

fn standard() -> DevFs {
    DevFs::new(&config()).expect("standard tree")
}

fn all_paths(fs: &DevFs) -> Vec<String> {
    let registry = fs.registry();
    registry.ids().map(|id| registry.path_of(id)).collect()
}

#[test]
fn test_every_node_opens_as_its_kind() {
    let fs = standard();
    for path in all_paths(&fs) {
        let kind = fs.lookup(&path).unwrap();
        let handle = fs.open(&path, OpenFlags::READ).unwrap();
        assert_eq!(handle.node_kind(), kind, "{}", path);
        let expected = match kind {
            NodeKind::Directory => HandleKind::Directory,
            NodeKind::CharDevice => HandleKind::Device,
            NodeKind::Symlink | NodeKind::File => HandleKind::Content,
        };
        assert_eq!(handle.kind(), expected, "{}", path);
        handle.close().unwrap();
    }
}

#[test]
fn test_root_listing_matches_declaration() {
    let fs = standard();
    let entries = fs.readdir("/").unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();

    let mut expected = vec!["null"];
    if cfg!(feature = "tty") {
        expected.push("tty");
    }
    expected.extend(["zero", "random", "urandom", "stdin", "stdout", "stderr"]);
    if cfg!(feature = "attestation") {
        expected.push("attestation");
    }
    assert_eq!(names, expected);
    assert!(!names.contains(&"."));
    assert!(!names.contains(&".."));

    // Restartable: a second listing is identical
    assert_eq!(fs.readdir("").unwrap(), entries);

    let root = fs.open("", OpenFlags::READ).unwrap();
    assert_eq!(root.dir_entries().unwrap(), entries.as_slice());
}

#[test]
fn test_dir_entry_kinds() {
    let fs = standard();
    for entry in fs.readdir("").unwrap() {
        assert_eq!(fs.lookup(&entry.name).unwrap(), entry.kind);
        assert_eq!(fs.stat(&entry.name).unwrap().ino, entry.ino);
    }
}

#[test]
fn test_stdio_links_default_target() {
    let fs = standard();
    for name in STDIO_LINKS {
        assert_eq!(fs.lookup(name).unwrap(), NodeKind::Symlink);
        assert_eq!(fs.follow_link(name).unwrap(), "/proc/self/fd/0");
    }
}

#[test]
fn test_stdio_links_configured_targets() {
    let config = config().with_stdio_targets("/proc/self/fd/0", "/proc/self/fd/1", "/proc/self/fd/2");
    let fs = DevFs::new(&config).unwrap();
    assert_eq!(fs.follow_link("stdin").unwrap(), "/proc/self/fd/0");
    assert_eq!(fs.follow_link("/stdout").unwrap(), "/proc/self/fd/1");
    assert_eq!(fs.follow_link("stderr/").unwrap(), "/proc/self/fd/2");
    assert_eq!(fs.stat("stderr").unwrap().size, "/proc/self/fd/2".len() as u64);
}

#[test]
fn test_mode_bits_per_kind() {
    let fs = standard();
    assert_eq!(fs.mode("").unwrap(), FileMode(FileMode::S_IFDIR | 0o555));
    assert_eq!(fs.mode("null").unwrap(), FileMode(FileMode::S_IFCHR | 0o666));
    assert_eq!(fs.mode("urandom").unwrap(), FileMode(FileMode::S_IFCHR | 0o666));
    assert_eq!(fs.mode("stdin").unwrap(), FileMode(FileMode::S_IFLNK | 0o777));
    assert_eq!(fs.mode("missing"), Err(DevError::NotFound));
}

#[test]
fn test_device_numbers() {
    let fs = standard();
    let cases = [("null", 1, 3), ("zero", 1, 5), ("random", 1, 8), ("urandom", 1, 9)];
    for (name, major, minor) in cases {
        let attr = fs.stat(name).unwrap();
        assert_eq!(attr.rdev, makedev(major, minor), "{}", name);
        assert_eq!(attr.size, 0);
        assert_eq!(attr.nlink, 1);
        assert_eq!(attr.blksize, 4096);
    }
    if cfg!(feature = "tty") {
        assert_eq!(fs.stat("tty").unwrap().rdev, makedev(5, 0));
    }
    assert_eq!(makedev(1, 3), 0x103);
    assert_eq!(makedev(5, 0), 0x500);
    assert_eq!(fs.stat("stdin").unwrap().rdev, 0);
}

#[test]
fn test_random_and_urandom_share_a_table() {
    let fs = standard();
    let random = fs.open("random", OpenFlags::READ).unwrap();
    let urandom = fs.open("urandom", OpenFlags::READ).unwrap();
    assert!(random.binding().unwrap().same_table(urandom.binding().unwrap()));
    assert_ne!(random.binding().unwrap().minor(), urandom.binding().unwrap().minor());
}

#[test]
fn test_random_reads_differ() {
    let fs = standard();
    let mut handle = fs.open("urandom", OpenFlags::READ).unwrap();
    let mut first = [0u8; 64];
    let mut second = [0u8; 64];
    assert_eq!(handle.read(&mut first), Ok(64));
    assert_eq!(handle.read(&mut second), Ok(64));
    assert_ne!(first, second);
}

#[test]
fn test_default_config_has_no_random_source() {
    let err = DevFs::new(&DevFsConfig::default()).unwrap_err();
    assert_eq!(err, BuildError::MissingEntropySource);
    assert_eq!(err.errno(), 22);
}

#[test]
fn test_independent_trees_read_their_own_sources() {
    let a = DevFs::new(&DevFsConfig::default().with_entropy(std::sync::Arc::new(devices::XorShiftSource::new(1)))).unwrap();
    let b = DevFs::new(&DevFsConfig::default().with_entropy(std::sync::Arc::new(devices::XorShiftSource::new(2)))).unwrap();
    let mut x = [0u8; 32];
    let mut y = [0u8; 32];
    a.open("random", OpenFlags::READ).unwrap().read(&mut x).unwrap();
    b.open("urandom", OpenFlags::READ).unwrap().read(&mut y).unwrap();
    assert_ne!(x, y);
}

#[test]
fn test_random_write_is_a_sink() {
    let a = DevFs::new(&DevFsConfig::default().with_seed(99)).unwrap();
    let b = DevFs::new(&DevFsConfig::default().with_seed(99)).unwrap();
    let mut ha = a.open("random", OpenFlags::READ | OpenFlags::WRITE).unwrap();
    let mut hb = b.open("random", OpenFlags::READ).unwrap();
    assert_eq!(ha.write(&[1, 2, 3, 4, 5]), Ok(5));

    let mut x = [0u8; 16];
    let mut y = [0u8; 16];
    ha.read(&mut x).unwrap();
    hb.read(&mut y).unwrap();
    assert_eq!(x, y);
}

#[test]
fn test_unknown_paths() {
    let fs = standard();
    for path in ["nul", "NULL", "null/extra", "./null", "../dev/null", "attestation/nope"] {
        assert_eq!(fs.lookup(path), Err(DevError::NotFound), "{}", path);
        assert_eq!(fs.open(path, OpenFlags::READ).err(), Some(DevError::NotFound));
        assert_eq!(fs.stat(path), Err(DevError::NotFound));
    }
    assert_eq!(fs.readdir("nope"), Err(DevError::NotFound));
    assert_eq!(fs.follow_link("nope"), Err(DevError::NotFound));
}

#[test]
#[should_panic(expected = "invalid handle state")]
fn test_readdir_on_symlink_panics() {
    let _ = standard().readdir("stdin");
}

#[test]
#[should_panic(expected = "invalid handle state")]
fn test_follow_link_on_directory_panics() {
    let _ = standard().follow_link("");
}

#[test]
#[should_panic(expected = "invalid handle state")]
fn test_set_binding_on_directory_panics() {
    let _ = standard().set_binding("", DeviceBinding::unbound(1, 3));
}

#[test]
fn test_custom_tree_mixing_styles() {
    let mut builder = Registry::builder("dev");
    builder.add_device("", "null", devices::NullDevice::binding()).unwrap();
    builder
        .add_spec(
            "",
            NodeSpec::dir("pts", vec![NodeSpec::device("0", DeviceBinding::unbound(136, 0))]).with_declared_len(1),
        )
        .unwrap();
    builder
        .add_file("pts", "README", std::sync::Arc::new(TextFile::new("ptys")), FileMode::PERM_FILE_R)
        .unwrap();
    assert!(matches!(
        builder.build(),
        Err(BuildError::ChildCountMismatch { declared: 1, actual: 2, .. })
    ));
}

#[test]
fn test_build_error_errno() {
    let mut builder = Registry::builder("dev");
    builder.add_symlink("", "stdin", "a").unwrap();
    builder.add_symlink("", "stdin", "b").unwrap();
    let err = builder.build().unwrap_err();
    assert_eq!(err.errno(), 22);
    assert_eq!(err.to_string(), "Duplicate entry `stdin` in `/`");
}

#[cfg(feature = "attestation")]
#[test]
fn test_attestation_files() {
    let fs = DevFs::new(&config().with_attestation_type("dcap")).unwrap();
    assert_eq!(fs.lookup("attestation").unwrap(), NodeKind::Directory);
    let names: Vec<String> = fs.readdir("attestation").unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["attestation_type", "user_report_data"]);

    let mut ty = fs.open("attestation/attestation_type", OpenFlags::READ).unwrap();
    let mut buf = [0u8; 16];
    let n = ty.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"dcap");
    assert_eq!(ty.write(b"sgx"), Err(DevError::AccessDenied));

    let mut report = fs.open("attestation/user_report_data", OpenFlags::READ | OpenFlags::WRITE).unwrap();
    assert_eq!(report.write(&[0xab; 8]), Ok(8));
    report.close().unwrap();

    let mut again = fs.open("attestation/user_report_data", OpenFlags::READ).unwrap();
    let mut data = [0u8; 64];
    assert_eq!(again.read(&mut data), Ok(64));
    assert_eq!(&data[..8], &[0xab; 8]);
    assert!(data[8..].iter().all(|b| *b == 0));
    assert_eq!(fs.stat("attestation/user_report_data").unwrap().size, 64);
}

#[test]
fn test_global_instance() {
    assert_eq!(init_devfs(&DevFsConfig::default()).err(), Some(BuildError::MissingEntropySource));
    assert!(devfs().is_none());

    let fs = init_devfs(&config()).unwrap();
    let global = devfs().expect("installed");
    assert!(std::sync::Arc::ptr_eq(&fs, &global));
    assert_eq!(DEVFS_NAME, "dev");
    let mut handle = global.open("null", OpenFlags::WRITE).unwrap();
    shutdown_devfs();
    assert!(devfs().is_none());
    assert_eq!(handle.write(b"still open"), Ok(10));
}
