pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# TAILPOLL CONFIGURATION
# =============================================================================
# Each section below enables one log format. A section lists the directories
# that hold that format's daily files; tailpoll reads whatever was appended to
# today's file since the previous run and prints one JSON batch per format.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/tailpoll/config.yml
#   3. /etc/tailpoll/config.yml
#
# Directories may start with ~ and may reference environment variables.

# Structured process logs, read from <dir>/node-YYYYMMDD.log
node_log:
  logdir:
    - /var/log/app
  # Most recent lines kept per directory between runs
  capacity: 250

# Access logs, read from <dir>/access-YYYYMMDD.log
slow_http:
  logdir:
    - /var/log/app
  capacity: 10

# Which calendar decides today's file name: 'local' or 'utc'
clock: local

# Time between collection runs for `tailpoll run`
interval: 60s
"#
    .to_string()
}
