/// A benchmark input: a fixture file and the group it is reported in.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    file: TestFile,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, file: TestFile) -> Self {
        Self { name, group, file }
    }

    pub fn small(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Small, file)
    }

    pub fn large(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Large, file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    /// Benchmark id made of the group and the case name, e.g. `small/flat_query`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.group.as_str(), self.name)
    }
}

/// Static fixture content, included at compile time.
#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    /// The non-empty lines of the file, for fixtures holding one input per line.
    pub fn lines(&self) -> impl Iterator<Item = &'static str> {
        self.content.lines().map(str::trim).filter(|line| !line.is_empty())
    }

    /// Total length of all inputs in bytes.
    pub fn input_len(&self) -> u64 {
        self.lines().map(|line| line.len() as u64).sum()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Large,
}

impl TestGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestGroup::Small => "small",
            TestGroup::Large => "large",
        }
    }
}
