/// Programs a user may start directly. Names only; a first token containing
/// a path is never matched against this list.
pub const ALLOWED_COMMANDS: &[&str] = &[
    // files and directories
    "ls", "dir", "tree", "pwd", "cd", "mkdir", "rmdir", "touch", "cp", "mv", "rm", "ln",
    "stat", "file", "du", "df", "find", "locate", "basename", "dirname", "realpath",
    "readlink", "chmod", "mktemp", "install", "truncate", "shred", "split", "csplit",
    // viewing and text processing
    "cat", "tac", "less", "more", "head", "tail", "nl", "wc", "sort", "uniq", "cut",
    "paste", "join", "tr", "fold", "fmt", "column", "expand", "unexpand", "rev", "comm",
    "diff", "diff3", "cmp", "patch", "grep", "egrep", "fgrep", "rg", "ag", "sed", "awk",
    "gawk", "mawk", "jq", "yq", "xq", "strings", "od", "hexdump", "xxd", "iconv", "dos2unix",
    "unix2dos", "tee", "xargs", "envsubst", "printf", "echo", "yes", "seq", "shuf",
    "look", "numfmt", "pr", "tsort", "ptx",
    // editors
    "nano", "vi", "vim", "nvim", "emacs", "ed", "micro",
    // archives and compression
    "tar", "gzip", "gunzip", "zcat", "bzip2", "bunzip2", "bzcat", "xz", "unxz", "xzcat",
    "zstd", "unzstd", "zip", "unzip", "7z", "lz4", "cpio",
    // hashing and encoding
    "md5sum", "sha1sum", "sha224sum", "sha256sum", "sha384sum", "sha512sum", "b2sum",
    "cksum", "sum", "base32", "base64", "basenc", "openssl", "gpg",
    // shell utilities
    "true", "false", "test", "expr", "sleep", "date", "cal", "env", "printenv", "which",
    "whereis", "type", "whoami", "id", "groups", "uname", "hostname", "uptime", "tty",
    "timeout", "time", "watch", "nohup", "nproc", "getconf", "factor", "bc", "dc", "clear", "reset",
    "script", "stdbuf", "nice", "tput", "locale", "man", "info", "help", "history",
    // processes (own processes only; the OS enforces ownership)
    "ps", "top", "htop", "pgrep", "pkill", "kill", "killall", "jobs", "free", "vmstat",
    "iostat", "lsof", "pstree", "pidof",
    // networking clients
    "curl", "wget", "ping", "traceroute", "tracepath", "dig", "nslookup", "host", "whois",
    "nc", "netstat", "ss", "ip", "ifconfig", "ssh", "scp", "sftp", "rsync", "ftp", "telnet",
    "httpie", "http", "aria2c",
    // version control
    "git", "hg", "svn", "gh", "git-lfs",
    // python
    "python", "python3", "pip", "pip3", "pipx", "poetry", "uv", "virtualenv", "pytest",
    "black", "ruff", "flake8", "mypy", "pylint", "isort", "ipython", "jupyter",
    // javascript
    "node", "npm", "npx", "yarn", "pnpm", "bun", "deno", "tsc", "eslint", "prettier",
    // other languages and build tools
    "cargo", "rustc", "rustup", "rustfmt", "go", "gofmt", "java", "javac", "jar", "mvn",
    "gradle", "kotlin", "kotlinc", "scala", "sbt", "ruby", "gem", "bundle", "irb", "rake",
    "perl", "php", "composer", "lua", "luajit", "R", "Rscript", "julia", "swift",
    "dotnet", "gcc", "g++", "cc", "c++", "clang", "clang++", "make", "cmake", "ninja",
    "meson", "ld", "ar", "nm", "objdump", "readelf", "strip", "gdb", "valgrind",
    "pkg-config", "autoconf", "automake", "sqlite3", "psql", "mysql", "redis-cli",
    "mongosh",
    // shells for user scripts
    "sh", "bash", "zsh", "dash",
    // terminal helpers
    "screen", "tmux", "ffmpeg", "convert", "identify", "pandoc",
];
