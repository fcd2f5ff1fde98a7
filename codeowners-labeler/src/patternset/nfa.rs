use memchr::memmem;

#[derive(Clone, Debug)]
pub(crate) struct Nfa {
    states: Vec<State>,
}

impl Nfa {
    pub(crate) const START_STATE: StateId = StateId(0);

    pub(crate) fn new() -> Self {
        Self {
            states: vec![State::new()],
        }
    }

    pub(crate) fn add_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(State::new());
        StateId(id as u32)
    }

    #[inline]
    pub(crate) fn state(&self, id: StateId) -> &State {
        &self.states[usize::from(id)]
    }

    #[inline]
    pub(crate) fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[usize::from(id)]
    }

    #[cfg(test)]
    pub(crate) fn states_iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub(crate) fn initial_states(&self) -> Vec<StateId> {
        let mut states = vec![Self::START_STATE];
        if let Some(epsilon_node_id) = self.state(Self::START_STATE).epsilon_transition {
            states.push(epsilon_node_id);
        }
        states
    }

    pub(crate) fn transitions_from(&self, state_id: StateId) -> impl Iterator<Item = &Transition> {
        self.state(state_id).transitions.iter()
    }

    pub(crate) fn epsilon_transitions_from(&self, state_id: StateId) -> Option<StateId> {
        self.state(state_id).epsilon_transition
    }

    // Follow every transition matching `segment` from the given states, then
    // traverse epsilon edges from the states we land in.
    pub(crate) fn step(&self, from_states: &[StateId], segment: &str) -> Vec<StateId> {
        let mut next_states = Vec::new();
        for &state_id in from_states {
            self.transitions_from(state_id)
                .filter(|transition| transition.is_match(segment))
                .for_each(|transition| next_states.push(transition.target));
        }

        let epsilon_nodes = next_states
            .iter()
            .flat_map(|&state_id| self.epsilon_transitions_from(state_id))
            .collect::<Vec<_>>();
        next_states.extend(epsilon_nodes);

        // Globstar self-loops are reachable along several routes
        next_states.sort_unstable();
        next_states.dedup();
        next_states
    }
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct StateId(pub(crate) u32);

impl From<StateId> for usize {
    fn from(id: StateId) -> usize {
        id.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct State {
    pub(crate) terminal_for_patterns: Vec<usize>,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) epsilon_transition: Option<StateId>,
}

impl State {
    fn new() -> Self {
        Self {
            terminal_for_patterns: Vec::new(),
            transitions: Vec::new(),
            epsilon_transition: None,
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        !self.terminal_for_patterns.is_empty()
    }

    pub(crate) fn add_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub(crate) fn mark_as_terminal(&mut self, pattern_id: usize) {
        self.terminal_for_patterns.push(pattern_id);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Transition {
    pub(crate) path_segment: String,
    condition: TransitionCondition,
    // Wildcard-led segments never match a leading `.`; the dot has to be
    // spelled out, as in `.github` or `.*rc`.
    matches_dotfiles: bool,
    pub(crate) target: StateId,
}

impl Transition {
    pub(crate) fn new(path_segment: String, target: StateId) -> Transition {
        let tokens = tokenize(&path_segment);
        let matches_dotfiles = !matches!(
            tokens.first(),
            Some(Token::AnyRun | Token::AnyChar | Token::Class { .. })
        );
        let condition = TransitionCondition::from_tokens(&path_segment, &tokens);
        Self {
            path_segment,
            condition,
            matches_dotfiles,
            target,
        }
    }

    pub(crate) fn is_match(&self, candidate: &str) -> bool {
        if !self.matches_dotfiles && candidate.starts_with('.') {
            return false;
        }
        self.condition.is_match(candidate)
    }
}

// A single path segment of a glob. Most segments in CODEOWNERS files are
// literals or use a single leading or trailing star, so those get cheap
// string comparisons and only the rest fall back to a regex.
#[derive(Debug, Clone)]
enum TransitionCondition {
    Unconditional,
    Literal(String),
    Prefix(String),
    Suffix(String),
    Contains(memmem::Finder<'static>),
    Regex(regex::Regex),
}

impl TransitionCondition {
    fn from_tokens(glob: &str, tokens: &[Token]) -> Self {
        if tokens.iter().all(|t| *t == Token::AnyRun) && !tokens.is_empty() {
            return Self::Unconditional;
        }

        let leading_star = tokens.first() == Some(&Token::AnyRun);
        let trailing_star = tokens.len() > 1 && tokens.last() == Some(&Token::AnyRun);
        let inner = &tokens[leading_star as usize..tokens.len() - trailing_star as usize];
        let inner_literal = inner
            .iter()
            .map(|t| match t {
                Token::Char(c) => Some(*c),
                _ => None,
            })
            .collect::<Option<String>>();

        match (leading_star, trailing_star, inner_literal) {
            (false, false, Some(literal)) => Self::Literal(literal),
            (false, true, Some(literal)) => Self::Prefix(literal),
            (true, false, Some(literal)) => Self::Suffix(literal),
            (true, true, Some(literal)) => {
                Self::Contains(memmem::Finder::new(literal.as_bytes()).into_owned())
            }
            _ => match tokens_to_regex(tokens) {
                Some(re) => Self::Regex(re),
                None => Self::Literal(glob.to_owned()),
            },
        }
    }

    fn is_match(&self, candidate: &str) -> bool {
        match self {
            Self::Unconditional => true,
            Self::Literal(literal) => literal == candidate,
            Self::Prefix(prefix) => candidate.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => candidate.ends_with(suffix.as_str()),
            Self::Contains(finder) => finder.find(candidate.as_bytes()).is_some(),
            Self::Regex(re) => re.is_match(candidate),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Char(char),
    AnyChar,
    AnyRun,
    Class { negated: bool, items: Vec<ClassItem> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassItem {
    Single(char),
    Range(char, char),
}

fn tokenize(glob: &str) -> Vec<Token> {
    let chars = glob.chars().collect::<Vec<_>>();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                tokens.push(Token::Char(chars[i + 1]));
                i += 2;
            }
            '*' => {
                // Consecutive stars inside a segment behave like one
                if tokens.last() != Some(&Token::AnyRun) {
                    tokens.push(Token::AnyRun);
                }
                i += 1;
            }
            '?' => {
                tokens.push(Token::AnyChar);
                i += 1;
            }
            '[' => match parse_class(&chars[i + 1..]) {
                Some((token, consumed)) => {
                    tokens.push(token);
                    i += consumed + 1;
                }
                // An unterminated class is just a literal bracket
                None => {
                    tokens.push(Token::Char('['));
                    i += 1;
                }
            },
            c => {
                tokens.push(Token::Char(c));
                i += 1;
            }
        }
    }
    tokens
}

// Parse the body of a bracket expression (everything after the opening `[`).
// Returns the token and the number of chars consumed, including the closing
// `]`.
fn parse_class(chars: &[char]) -> Option<(Token, usize)> {
    let mut i = 0;
    let negated = matches!(chars.first(), Some('!' | '^'));
    if negated {
        i += 1;
    }

    let mut items = Vec::new();
    let mut first = true;
    while i < chars.len() {
        let c = match chars[i] {
            ']' if !first => return Some((Token::Class { negated, items }, i + 1)),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                chars[i]
            }
            c => c,
        };
        first = false;

        if chars.get(i + 1) == Some(&'-') && matches!(chars.get(i + 2), Some(&hi) if hi != ']') {
            let hi = chars[i + 2];
            if c <= hi {
                items.push(ClassItem::Range(c, hi));
            } else {
                items.extend([c, '-', hi].map(ClassItem::Single));
            }
            i += 3;
        } else {
            items.push(ClassItem::Single(c));
            i += 1;
        }
    }
    None
}

fn tokens_to_regex(tokens: &[Token]) -> Option<regex::Regex> {
    let mut regex = String::with_capacity(tokens.len() + 8);
    regex.push_str(r#"\A"#);
    for token in tokens {
        match token {
            Token::Char(c) => push_escaped(&mut regex, *c),
            Token::AnyChar => regex.push_str(r#"[^/]"#),
            Token::AnyRun => regex.push_str(r#"[^/]*"#),
            Token::Class { negated, items } => {
                regex.push('[');
                if *negated {
                    regex.push('^');
                }
                for item in items {
                    match *item {
                        ClassItem::Single(c) => push_escaped(&mut regex, c),
                        ClassItem::Range(lo, hi) => {
                            push_escaped(&mut regex, lo);
                            regex.push('-');
                            push_escaped(&mut regex, hi);
                        }
                    }
                }
                regex.push(']');
            }
        }
    }
    regex.push_str(r#"\z"#);
    regex::Regex::new(&regex).ok()
}

fn push_escaped(regex: &mut String, c: char) {
    if regex_syntax::is_meta_character(c) {
        regex.push('\\');
    }
    regex.push(c);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(glob: &str) -> TransitionCondition {
        TransitionCondition::from_tokens(glob, &tokenize(glob))
    }

    #[test]
    fn test_condition_kinds() {
        assert!(matches!(cond("*"), TransitionCondition::Unconditional));
        assert!(matches!(cond("foo"), TransitionCondition::Literal(ref l) if l == "foo"));
        assert!(matches!(cond("f\\*o"), TransitionCondition::Literal(ref l) if l == "f*o"));
        assert!(matches!(cond("foo*"), TransitionCondition::Prefix(ref p) if p == "foo"));
        assert!(matches!(cond("*.js"), TransitionCondition::Suffix(ref s) if s == ".js"));
        assert!(matches!(cond("*foo*"), TransitionCondition::Contains(_)));
        assert!(matches!(cond("?oo"), TransitionCondition::Regex(_)));
        assert!(matches!(cond("f[ab]o"), TransitionCondition::Regex(_)));
    }

    #[test]
    fn test_segment_matching() {
        let examples = [
            ("*", "", true),
            ("*", "anything", true),
            ("foo", "foo", true),
            ("foo", "fo", false),
            ("foo*", "foobar", true),
            ("foo*", "barfoo", false),
            ("*.js", "javascript.js", true),
            ("*.js", "javascript.ts", false),
            ("*oo*", "book", true),
            ("*oo*", "bark", false),
            ("?oo", "foo", true),
            ("?oo", "oo", false),
            ("f??", "foo", true),
            ("b??", "foo", false),
            ("a*b*c", "aXbYc", true),
            ("a*b*c", "aXc", false),
            ("[abc].rs", "b.rs", true),
            ("[abc].rs", "d.rs", false),
            ("[a-c]x", "bx", true),
            ("[a-c]x", "dx", false),
            ("[!a-c]x", "dx", true),
            ("[^a-c]x", "ax", false),
            ("[]]", "]", true),
            ("[z-a]", "-", true),
            ("[z-a]", "m", false),
            ("[abc", "[abc", true),
            ("a.b", "a.b", true),
            ("a.b", "axb", false),
            ("(x)?", "(x)!", true),
            ("*\\?", "what?", true),
            ("*\\?", "whats", false),
        ];

        for (glob, candidate, expected) in examples {
            assert_eq!(
                cond(glob).is_match(candidate),
                expected,
                "`{}` against `{}`",
                glob,
                candidate
            );
        }
    }

    #[test]
    fn test_wildcard_led_segments_skip_dotfiles() {
        let examples = [
            ("*", ".env", false),
            ("*.js", ".eslintrc.js", false),
            ("*rc*", ".bashrc", false),
            ("?env", ".env", false),
            ("[.a]env", ".env", false),
            ("*", "env", true),
            (".*", ".env", true),
            (".github", ".github", true),
            ("\\.env", ".env", true),
            ("*", "", true),
        ];

        for (glob, candidate, expected) in examples {
            let transition = Transition::new(glob.to_owned(), StateId(1));
            assert_eq!(
                transition.is_match(candidate),
                expected,
                "`{}` against `{}`",
                glob,
                candidate
            );
        }
    }

    #[test]
    fn test_step_follows_epsilon_edges() {
        let mut nfa = Nfa::new();
        let a = nfa.add_state();
        let eps = nfa.add_state();
        nfa.state_mut(Nfa::START_STATE)
            .add_transition(Transition::new("a".to_owned(), a));
        nfa.state_mut(a).epsilon_transition = Some(eps);
        nfa.state_mut(eps)
            .add_transition(Transition::new("*".to_owned(), eps));

        assert_eq!(nfa.step(&nfa.initial_states(), "a"), vec![a, eps]);
        assert_eq!(nfa.step(&[a, eps], "b"), vec![eps]);
        assert!(nfa.step(&nfa.initial_states(), "b").is_empty());
    }
}
