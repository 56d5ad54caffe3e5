//! Example binaries for tabprobe; see the `[[example]]` targets.
